//! Validation and construction of the joint trade transaction
//!
//! A [`TradeChecker`] is instantiated per trade with the resolved buyer and
//! seller and performs every check either side must make before contributing
//! funds or signatures.  Both sides compute the expected name-update value
//! through the same code path; the seller compares the string in the
//! transaction literally against it, which side-steps attacks based on
//! unusual JSON serialisation.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use common::error::{Error, Result};
use common::model::order::{Amount, Asset};
use common::model::psbt::DecodedPsbt;
use common::model::trade::{OutPoint, SellerData};

use crate::asset::AssetSpec;
use crate::config::EngineConfig;
use crate::rpc::WalletRpc;

/// The full Xaya name corresponding to an account name.
pub fn xaya_name(account: &str) -> String {
    format!("p/{account}")
}

/// Checks and builds the joint transaction of one trade.
pub struct TradeChecker {
    spec: Arc<dyn AssetSpec>,
    wallet: Arc<dyn WalletRpc>,
    config: EngineConfig,

    buyer: String,
    seller: String,
    asset: Asset,
    price_sat: Amount,
    units: Amount,
}

impl TradeChecker {
    pub fn new(
        spec: Arc<dyn AssetSpec>,
        wallet: Arc<dyn WalletRpc>,
        config: EngineConfig,
        buyer: impl Into<String>,
        seller: impl Into<String>,
        asset: Asset,
        price_sat: Amount,
        units: Amount,
    ) -> Self {
        TradeChecker {
            spec,
            wallet,
            config,
            buyer: buyer.into(),
            seller: seller.into(),
            asset,
            price_sat,
            units,
        }
    }

    /// The name_update value that transfers the asset.  Wraps the game's
    /// transfer move inside the game id and adds an empty "dem" move for
    /// tracking.
    pub fn name_update_value(&self) -> Result<String> {
        let mv = self
            .spec
            .transfer_move(&self.seller, &self.buyer, &self.asset, self.units);
        let full = json!({
            "g": {
                (self.spec.game_id()): mv,
                "dem": {},
            },
        });
        Ok(serde_json::to_string(&full)?)
    }

    /// The total price of the trade in satoshi.  Fails on overflow.
    pub fn total_sat(&self) -> Result<Amount> {
        self.units
            .checked_mul(self.price_sat)
            .ok_or(Error::PriceOverflow {
                units: self.units,
                price_sat: self.price_sat,
            })
    }

    /// Checks the trade from the buyer's point of view: the seller holds
    /// the assets according to the game state, and that state is current
    /// with respect to the seller's confirmed name output.  On success,
    /// returns the name outpoint to use as input of the joint transaction.
    ///
    /// The name output is looked up first and the game state second.  If
    /// the game-state block descends from the block at which the name
    /// output was unspent (within a few blocks), the answer is reliable:
    /// the game's asset rules guarantee the answer only changes through a
    /// name update, and any such update double-spends our chosen input
    /// anyway.
    pub async fn check_for_buyer_trade(&self) -> Result<Option<OutPoint>> {
        if !self.spec.is_asset(&self.asset).await {
            warn!(asset = %self.asset, "not a valid asset");
            return Ok(None);
        }

        if !self.spec.can_buy(&self.buyer, &self.asset, self.units).await {
            warn!(
                buyer = %self.buyer, asset = %self.asset, units = self.units,
                "buyer cannot receive assets"
            );
            return Ok(None);
        }

        let name_input = self
            .wallet
            .name_outpoint(&xaya_name(&self.seller))
            .await?;

        let Some(utxo) = self.wallet.utxo_status(&name_input).await? else {
            warn!(?name_input, "name output not found; still syncing?");
            return Ok(None);
        };

        let Some(spec_block) = self
            .spec
            .can_sell(&self.seller, &self.asset, self.units)
            .await
        else {
            warn!(
                seller = %self.seller, asset = %self.asset, units = self.units,
                "seller cannot send assets"
            );
            return Ok(None);
        };

        if !self
            .is_block_ancestor(&utxo.best_block, &spec_block, self.config.max_block_ancestors)
            .await?
        {
            warn!(
                utxo_block = %utxo.best_block, spec_block = %spec_block,
                "name-output block is not an ancestor of the game-state block"
            );
            return Ok(None);
        }

        Ok(Some(name_input))
    }

    /// Whether `ancestor` is the same block as `child` or one of its last
    /// `n` parents.  Race conditions with new blocks arriving between two
    /// queries typically shift the hashes by at most one block, so a small
    /// `n` suffices.
    async fn is_block_ancestor(&self, ancestor: &str, child: &str, n: u64) -> Result<bool> {
        let mut current = child.to_string();
        let mut remaining = n;
        loop {
            if current == ancestor {
                return Ok(true);
            }
            if remaining == 0 {
                return Ok(false);
            }
            remaining -= 1;

            let header = self.wallet.block_header(&current).await?;
            match header.previousblockhash {
                // Genesis has no parent.
                None => return Ok(false),
                Some(parent) => current = parent,
            }
        }
    }

    /// Builds the unsigned joint transaction: a wallet-funded part paying
    /// the seller's price, joined with the name-update part spending the
    /// seller's name into the transfer move.  If the total price is zero,
    /// the payment part is omitted entirely.
    pub async fn construct_transaction(
        &self,
        sd: &SellerData,
        name_input: &OutPoint,
    ) -> Result<String> {
        let name_address = sd
            .name_address
            .as_deref()
            .ok_or_else(|| Error::InvalidTradeState("seller data without name address".into()))?;
        let chi_address = sd
            .chi_address
            .as_deref()
            .ok_or_else(|| Error::InvalidTradeState("seller data without chi address".into()))?;

        let value = self.name_update_value()?;
        let name_part = self
            .wallet
            .name_update_psbt(
                name_input,
                &xaya_name(&self.seller),
                &value,
                name_address,
                self.config.name_output_sat,
            )
            .await?;

        let total = self.total_sat()?;
        if total == 0 {
            debug!("total is zero, no payment part needed");
            return Ok(name_part);
        }

        let mut outputs = BTreeMap::new();
        outputs.insert(chi_address.to_string(), total);
        let chi_part = self
            .wallet
            .funded_payment_psbt(&outputs, self.config.fee_rate)
            .await?;

        Ok(self
            .wallet
            .join_psbts(&[chi_part, name_part])
            .await?)
    }

    /// Verifies the buyer's wallet signed all inputs except exactly one
    /// (the seller's name input, which the buyer cannot sign).  Protects
    /// against being tricked into signing everything if the seller
    /// impersonates a name held in the buyer's own wallet.
    pub fn check_for_buyer_signature(&self, before: &DecodedPsbt, after: &DecodedPsbt) -> bool {
        if before.inputs.len() != after.inputs.len() {
            warn!("signed psbt has a different number of inputs");
            return false;
        }

        let mut unsigned = 0;
        for (b, a) in before.inputs.iter().zip(&after.inputs) {
            if b.signed {
                warn!("input was signed before we signed");
                return false;
            }
            if !a.signed {
                unsigned += 1;
            }
        }

        if unsigned != 1 {
            warn!(unsigned, "expected exactly one unsigned input after signing");
            return false;
        }
        true
    }

    /// Verifies the transaction pays the seller as agreed: one output
    /// updates the seller's name with exactly the expected value to the
    /// provided name address, and (unless the total is zero) some output
    /// pays at least the total to the provided payment address.
    pub fn check_for_seller_outputs(&self, decoded: &DecodedPsbt, sd: &SellerData) -> Result<bool> {
        let (Some(name_address), Some(chi_address)) = (&sd.name_address, &sd.chi_address) else {
            return Err(Error::InvalidTradeState(
                "seller data without addresses".into(),
            ));
        };

        let expected_total = self.total_sat()?;
        let expected_value = self.name_update_value()?;
        let expected_name = xaya_name(&self.seller);

        // With a zero total, no explicit payment output is needed.
        let mut found_chi = expected_total == 0;
        let mut found_name = false;

        for out in &decoded.tx.vout {
            if let Some(name_op) = &out.script.name_op {
                if name_op.op != "name_update" {
                    continue;
                }
                if name_op.name != expected_name {
                    continue;
                }
                if name_op.value != expected_value {
                    continue;
                }
                if !matches_address(&out.script.addresses, name_address) {
                    continue;
                }
                debug!("found output with expected name update");
                found_name = true;
                continue;
            }

            if !matches_address(&out.script.addresses, chi_address) {
                continue;
            }
            if out.value_sat < expected_total {
                continue;
            }
            debug!("found output with expected payment");
            found_chi = true;
        }

        if !found_chi {
            warn!("expected payment output not found");
            return Ok(false);
        }
        if !found_name {
            warn!("expected name output not found");
            return Ok(false);
        }
        Ok(true)
    }

    /// Verifies that signing as seller added a signature for exactly the
    /// seller's own name input and nothing else.
    pub fn check_for_seller_signature(
        &self,
        before: &DecodedPsbt,
        after: &DecodedPsbt,
        sd: &SellerData,
    ) -> bool {
        let Some(name_output) = &sd.name_output else {
            warn!("seller data has no name outpoint");
            return false;
        };

        if before.inputs.len() != after.inputs.len()
            || before.tx.vin.len() != before.inputs.len()
        {
            warn!("psbt input structure mismatch");
            return false;
        }

        for (idx, vin) in before.tx.vin.iter().enumerate() {
            let is_name_input = vin.txid == name_output.txid && vin.vout == name_output.vout;
            let newly_signed = !before.inputs[idx].signed && after.inputs[idx].signed;

            if newly_signed && !is_name_input {
                warn!(idx, "signed an input that is not our name input");
                return false;
            }
            if is_name_input && !after.inputs[idx].signed {
                warn!(idx, "our name input did not get signed");
                return false;
            }
        }
        true
    }
}

fn matches_address(addresses: &[String], addr: &str) -> bool {
    matches!(addresses, [single] if single == addr)
}
