//! Wallet/node RPC boundary
//!
//! All interaction with the Xaya wallet and node goes through [`WalletRpc`].
//! The engine only ever sees decoded, typed views of transactions; raw psbt
//! strings are opaque tokens passed back and forth.

use std::collections::BTreeMap;

use async_trait::async_trait;

use common::error::RpcError;
use common::model::order::Amount;
use common::model::psbt::{BlockHeader, DecodedPsbt, FinalizeResult, SignResult, UtxoStatus};
use common::model::trade::OutPoint;

/// Result type for RPC calls
pub type RpcResult<T> = std::result::Result<T, RpcError>;

/// Operations the engine needs from the wallet and node.
///
/// Implementations wrap a JSON-RPC client against Xaya Core.  Tests use an
/// in-memory fake.
#[async_trait]
pub trait WalletRpc: Send + Sync {
    /// Returns a fresh receiving address from the wallet.
    async fn new_address(&self) -> RpcResult<String>;

    /// Looks up the current outpoint of a name ("name_show").
    async fn name_outpoint(&self, name: &str) -> RpcResult<OutPoint>;

    /// Returns the status of an unspent output, or `None` if it is spent
    /// or unknown ("gettxout").
    async fn utxo_status(&self, outpoint: &OutPoint) -> RpcResult<Option<UtxoStatus>>;

    /// Returns the header of the block with the given hash.
    async fn block_header(&self, hash: &str) -> RpcResult<BlockHeader>;

    /// Creates a psbt paying the given outputs, funded from the wallet
    /// with change ("walletcreatefundedpsbt").
    async fn funded_payment_psbt(
        &self,
        outputs: &BTreeMap<String, Amount>,
        fee_rate: u64,
    ) -> RpcResult<String>;

    /// Creates an unfunded psbt spending the given name outpoint into a
    /// name-update output at vout 0, carrying the given value and paying
    /// `amount_sat` to `address`.
    async fn name_update_psbt(
        &self,
        input: &OutPoint,
        name: &str,
        value: &str,
        address: &str,
        amount_sat: Amount,
    ) -> RpcResult<String>;

    /// Joins psbts with disjoint inputs and outputs into one
    /// ("joinpsbts").
    async fn join_psbts(&self, psbts: &[String]) -> RpcResult<String>;

    /// Decodes a psbt into its structural view.
    async fn decode_psbt(&self, psbt: &str) -> RpcResult<DecodedPsbt>;

    /// Signs all inputs of a psbt that the wallet has keys for
    /// ("walletprocesspsbt").
    async fn sign_psbt(&self, psbt: &str) -> RpcResult<SignResult>;

    /// Combines two psbts for the same transaction, merging their
    /// signatures ("combinepsbt").
    async fn combine_psbts(&self, psbts: &[String]) -> RpcResult<String>;

    /// Finalises a psbt, extracting the raw transaction if all inputs
    /// are signed.
    async fn finalize_psbt(&self, psbt: &str) -> RpcResult<FinalizeResult>;

    /// Broadcasts a raw transaction, returning its txid.
    async fn send_raw_transaction(&self, hex: &str) -> RpcResult<String>;

    /// Returns the txid of the transaction inside a psbt as it would be
    /// without any signatures.  This identifier is stable across signing
    /// and is what the engine uses to recognise the trade on chain.
    async fn unsigned_txid(&self, psbt: &str) -> RpcResult<String>;
}
