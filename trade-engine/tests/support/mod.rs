//! Shared test doubles: an in-memory wallet RPC, a configurable asset
//! spec and a controllable clock.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use common::error::RpcError;
use common::model::order::{Amount, Asset};
use common::model::psbt::{
    BlockHeader, DecodedPsbt, FinalizeResult, NameOp, PsbtInput, ScriptPubKey, SignResult, TxIn,
    TxOut, UtxoStatus,
};
use common::model::trade::OutPoint;

use trade_engine::config::EngineConfig;
use trade_engine::manager::{Clock, TradeManager};
use trade_engine::rpc::{RpcResult, WalletRpc};
use trade_engine::state::StateHandle;
use trade_engine::AssetSpec;

// Mock wallet

#[derive(Default)]
struct WalletInner {
    next_addr: u64,
    fail_addresses: bool,

    decoded: HashMap<String, DecodedPsbt>,
    signed: HashMap<String, SignResult>,
    joined: HashMap<Vec<String>, String>,
    combined: HashMap<Vec<String>, String>,
    finalized: HashMap<String, FinalizeResult>,
    btxids: HashMap<String, String>,

    utxos: HashMap<(String, u32), String>,
    headers: HashMap<String, BlockHeader>,

    sent: Vec<String>,
    funded_calls: Vec<(String, Amount, u64)>,
    name_psbt_calls: Vec<(OutPoint, String, String, String, Amount)>,
}

/// Fake wallet whose psbt strings are opaque lookup keys.  Tests register
/// the decode/sign/join/finalize results they expect the engine to ask
/// for; unknown keys produce a not-found error.
#[derive(Default)]
pub struct MockWallet {
    inner: Mutex<WalletInner>,
}

impl MockWallet {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes subsequent address requests fail.
    pub fn fail_addresses(&self, fail: bool) {
        self.inner.lock().unwrap().fail_addresses = fail;
    }

    pub fn set_decoded(&self, psbt: &str, decoded: DecodedPsbt) {
        self.inner
            .lock()
            .unwrap()
            .decoded
            .insert(psbt.to_string(), decoded);
    }

    pub fn set_signed(&self, input: &str, output: &str, complete: bool) {
        self.inner.lock().unwrap().signed.insert(
            input.to_string(),
            SignResult {
                psbt: output.to_string(),
                complete,
            },
        );
    }

    pub fn set_joined(&self, parts: &[&str], output: &str) {
        self.inner.lock().unwrap().joined.insert(
            parts.iter().map(|s| s.to_string()).collect(),
            output.to_string(),
        );
    }

    pub fn set_combined(&self, parts: &[&str], output: &str) {
        self.inner.lock().unwrap().combined.insert(
            parts.iter().map(|s| s.to_string()).collect(),
            output.to_string(),
        );
    }

    pub fn set_finalized(&self, input: &str, result: FinalizeResult) {
        self.inner
            .lock()
            .unwrap()
            .finalized
            .insert(input.to_string(), result);
    }

    pub fn set_btxid(&self, psbt: &str, btxid: &str) {
        self.inner
            .lock()
            .unwrap()
            .btxids
            .insert(psbt.to_string(), btxid.to_string());
    }

    /// Registers a confirmed utxo and the chain tip it was seen at.
    pub fn add_utxo(&self, outpoint: &OutPoint, best_block: &str) {
        self.inner.lock().unwrap().utxos.insert(
            (outpoint.txid.clone(), outpoint.vout),
            best_block.to_string(),
        );
    }

    /// Installs a linear chain of block headers, genesis first.
    pub fn set_chain(&self, hashes: &[&str]) {
        let mut inner = self.inner.lock().unwrap();
        for (height, hash) in hashes.iter().enumerate() {
            inner.headers.insert(
                hash.to_string(),
                BlockHeader {
                    hash: hash.to_string(),
                    height: height as u64,
                    previousblockhash: (height > 0).then(|| hashes[height - 1].to_string()),
                    nextblockhash: hashes.get(height + 1).map(|h| h.to_string()),
                },
            );
        }
    }

    /// Raw transactions broadcast so far.
    pub fn sent(&self) -> Vec<String> {
        self.inner.lock().unwrap().sent.clone()
    }

    /// Arguments of all funded-psbt requests.
    pub fn funded_calls(&self) -> Vec<(String, Amount, u64)> {
        self.inner.lock().unwrap().funded_calls.clone()
    }

    /// Arguments of all name-update-psbt requests.
    pub fn name_psbt_calls(&self) -> Vec<(OutPoint, String, String, String, Amount)> {
        self.inner.lock().unwrap().name_psbt_calls.clone()
    }
}

/// The deterministic psbt string for a funded payment part.
pub fn chi_part(addr: &str, amount: Amount) -> String {
    format!("chi psbt {addr}:{amount}")
}

/// The deterministic psbt string for a name-update part.
pub fn name_part(name: &str) -> String {
    format!("name psbt {name}")
}

/// The name outpoint the mock returns for an account.
pub fn name_outpoint_of(account: &str) -> OutPoint {
    OutPoint {
        txid: format!("{account} txid"),
        vout: 12,
    }
}

#[async_trait]
impl WalletRpc for MockWallet {
    async fn new_address(&self) -> RpcResult<String> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_addresses {
            return Err(RpcError::Transport("wallet down".into()));
        }
        inner.next_addr += 1;
        Ok(format!("addr {}", inner.next_addr))
    }

    async fn name_outpoint(&self, name: &str) -> RpcResult<OutPoint> {
        let account = name
            .strip_prefix("p/")
            .ok_or_else(|| RpcError::InvalidArgument(name.to_string()))?;
        if account == "invalid" {
            return Err(RpcError::NotFound(name.to_string()));
        }
        Ok(name_outpoint_of(account))
    }

    async fn utxo_status(&self, outpoint: &OutPoint) -> RpcResult<Option<UtxoStatus>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .utxos
            .get(&(outpoint.txid.clone(), outpoint.vout))
            .map(|block| UtxoStatus {
                best_block: block.clone(),
            }))
    }

    async fn block_header(&self, hash: &str) -> RpcResult<BlockHeader> {
        let inner = self.inner.lock().unwrap();
        inner
            .headers
            .get(hash)
            .cloned()
            .ok_or_else(|| RpcError::NotFound(hash.to_string()))
    }

    async fn funded_payment_psbt(
        &self,
        outputs: &std::collections::BTreeMap<String, Amount>,
        fee_rate: u64,
    ) -> RpcResult<String> {
        assert_eq!(outputs.len(), 1, "engine funds exactly one payment output");
        let (addr, amount) = outputs.iter().next().unwrap();
        let mut inner = self.inner.lock().unwrap();
        inner.funded_calls.push((addr.clone(), *amount, fee_rate));
        Ok(chi_part(addr, *amount))
    }

    async fn name_update_psbt(
        &self,
        input: &OutPoint,
        name: &str,
        value: &str,
        address: &str,
        amount_sat: Amount,
    ) -> RpcResult<String> {
        let mut inner = self.inner.lock().unwrap();
        inner.name_psbt_calls.push((
            input.clone(),
            name.to_string(),
            value.to_string(),
            address.to_string(),
            amount_sat,
        ));
        Ok(name_part(name))
    }

    async fn join_psbts(&self, psbts: &[String]) -> RpcResult<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .joined
            .get(psbts)
            .cloned()
            .ok_or_else(|| RpcError::NotFound(format!("join {psbts:?}")))
    }

    async fn decode_psbt(&self, psbt: &str) -> RpcResult<DecodedPsbt> {
        let inner = self.inner.lock().unwrap();
        inner
            .decoded
            .get(psbt)
            .cloned()
            .ok_or_else(|| RpcError::NotFound(format!("decode {psbt:?}")))
    }

    async fn sign_psbt(&self, psbt: &str) -> RpcResult<SignResult> {
        let inner = self.inner.lock().unwrap();
        inner
            .signed
            .get(psbt)
            .cloned()
            .ok_or_else(|| RpcError::NotFound(format!("sign {psbt:?}")))
    }

    async fn combine_psbts(&self, psbts: &[String]) -> RpcResult<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .combined
            .get(psbts)
            .cloned()
            .ok_or_else(|| RpcError::NotFound(format!("combine {psbts:?}")))
    }

    async fn finalize_psbt(&self, psbt: &str) -> RpcResult<FinalizeResult> {
        let inner = self.inner.lock().unwrap();
        inner
            .finalized
            .get(psbt)
            .cloned()
            .ok_or_else(|| RpcError::NotFound(format!("finalize {psbt:?}")))
    }

    async fn send_raw_transaction(&self, hex: &str) -> RpcResult<String> {
        let mut inner = self.inner.lock().unwrap();
        inner.sent.push(hex.to_string());
        Ok(format!("txid of {hex}"))
    }

    async fn unsigned_txid(&self, psbt: &str) -> RpcResult<String> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .btxids
            .get(psbt)
            .cloned()
            .unwrap_or_else(|| format!("btxid of {psbt}")))
    }
}

// Decoded-psbt builders

pub fn vin(txid: &str, vout: u32) -> TxIn {
    TxIn {
        txid: txid.to_string(),
        vout,
    }
}

pub fn chi_out(addr: &str, value_sat: Amount) -> TxOut {
    TxOut {
        value_sat,
        script: ScriptPubKey {
            addresses: vec![addr.to_string()],
            name_op: None,
        },
    }
}

pub fn name_out(addr: &str, name: &str, value: &str, value_sat: Amount) -> TxOut {
    TxOut {
        value_sat,
        script: ScriptPubKey {
            addresses: vec![addr.to_string()],
            name_op: Some(NameOp {
                op: "name_update".to_string(),
                name: name.to_string(),
                value: value.to_string(),
            }),
        },
    }
}

/// A decoded psbt from inputs (with signing state) and outputs.
pub fn decoded(inputs: &[(TxIn, bool)], outputs: Vec<TxOut>) -> DecodedPsbt {
    DecodedPsbt {
        tx: common::model::psbt::DecodedTx {
            vin: inputs.iter().map(|(v, _)| v.clone()).collect(),
            vout: outputs,
        },
        inputs: inputs
            .iter()
            .map(|(_, signed)| PsbtInput { signed: *signed })
            .collect(),
    }
}

// Asset spec

#[derive(Default)]
struct AssetsInner {
    balances: HashMap<(String, Asset), Amount>,
    blocked_buyers: Vec<String>,
    block: String,
}

/// Asset spec with explicit balances.  `can_sell` answers at the block
/// set via [`TestAssets::set_block`].
pub struct TestAssets {
    inner: Mutex<AssetsInner>,
}

impl TestAssets {
    pub fn new(block: &str) -> Arc<Self> {
        Arc::new(TestAssets {
            inner: Mutex::new(AssetsInner {
                block: block.to_string(),
                ..Default::default()
            }),
        })
    }

    pub fn give(&self, account: &str, asset: &str, units: Amount) {
        self.inner
            .lock()
            .unwrap()
            .balances
            .insert((account.to_string(), asset.to_string()), units);
    }

    pub fn block_buyer(&self, account: &str) {
        self.inner
            .lock()
            .unwrap()
            .blocked_buyers
            .push(account.to_string());
    }

    pub fn set_block(&self, block: &str) {
        self.inner.lock().unwrap().block = block.to_string();
    }
}

#[async_trait]
impl AssetSpec for TestAssets {
    fn game_id(&self) -> &str {
        "test"
    }

    async fn is_asset(&self, asset: &Asset) -> bool {
        asset != "bogus"
    }

    async fn can_sell(&self, account: &str, asset: &Asset, units: Amount) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        let balance = inner
            .balances
            .get(&(account.to_string(), asset.clone()))
            .copied()
            .unwrap_or(0);
        (balance >= units).then(|| inner.block.clone())
    }

    async fn can_buy(&self, account: &str, _asset: &Asset, _units: Amount) -> bool {
        !self
            .inner
            .lock()
            .unwrap()
            .blocked_buyers
            .iter()
            .any(|a| a == account)
    }

    fn transfer_move(
        &self,
        _seller: &str,
        buyer: &str,
        asset: &Asset,
        units: Amount,
    ) -> serde_json::Value {
        json!({
            "amount": units,
            "asset": asset,
            "to": buyer,
        })
    }
}

/// The exact name-update value the engine will put into the transaction
/// for a transfer by [`TestAssets`].
pub fn expected_name_value(buyer: &str, asset: &str, units: Amount) -> String {
    serde_json::to_string(&json!({
        "g": {
            "test": {
                "amount": units,
                "asset": asset,
                "to": buyer,
            },
            "dem": {},
        },
    }))
    .unwrap()
}

// Clock

/// Clock standing still until told otherwise.
pub struct FrozenClock {
    now: Mutex<DateTime<Utc>>,
}

impl FrozenClock {
    pub fn new() -> Arc<Self> {
        Arc::new(FrozenClock {
            now: Mutex::new(Utc.timestamp_opt(1_000_000, 0).unwrap()),
        })
    }

    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::seconds(secs);
    }
}

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// Setup helpers

pub struct TestSetup {
    pub wallet: Arc<MockWallet>,
    pub assets: Arc<TestAssets>,
    pub clock: Arc<FrozenClock>,
    pub manager: TradeManager,
}

pub fn test_config() -> EngineConfig {
    EngineConfig {
        fee_rate: 100,
        name_output_sat: 1_000_000,
        max_block_ancestors: 3,
        required_confirmations: 6,
        trade_timeout_secs: 600,
    }
}

/// A manager for `account` with fresh collaborators.
pub fn setup(account: &str) -> TestSetup {
    setup_with(account, MockWallet::new(), TestAssets::new("blk 10"))
}

/// A manager sharing the given wallet and asset spec (used when two
/// managers trade with each other).
pub fn setup_with(
    account: &str,
    wallet: Arc<MockWallet>,
    assets: Arc<TestAssets>,
) -> TestSetup {
    setup_full(account, wallet, assets, Vec::new())
}

/// A manager whose state starts out with the given trades.
pub fn setup_with_trades(
    account: &str,
    trades: Vec<common::model::trade::TradeRecord>,
) -> TestSetup {
    setup_full(account, MockWallet::new(), TestAssets::new("blk 10"), trades)
}

fn setup_full(
    account: &str,
    wallet: Arc<MockWallet>,
    assets: Arc<TestAssets>,
    trades: Vec<common::model::trade::TradeRecord>,
) -> TestSetup {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let state = StateHandle::in_memory(account);
    state.write().trades = trades;

    let clock = FrozenClock::new();
    let manager = TradeManager::with_clock(
        state,
        wallet.clone(),
        assets.clone(),
        test_config(),
        clock.clone(),
    );
    TestSetup {
        wallet,
        assets,
        clock,
        manager,
    }
}
