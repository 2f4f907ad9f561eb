//! Trade models and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::order::{Amount, Asset, Order, OrderType};

/// State of a trade.
///
/// `Initiated` trades are still negotiating the joint transaction.
/// `Pending` trades have shared a (partially) signed transaction and are
/// tracked on-chain.  The remaining three states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeState {
    /// Trade agreed, transaction not yet fully constructed and signed
    Initiated,
    /// Transaction shared, waiting for on-chain confirmation
    Pending,
    /// Transaction confirmed with sufficient depth
    Success,
    /// A double spend of one of the transaction's inputs was confirmed
    Failed,
    /// Either side withdrew before signatures were shared
    Abandoned,
}

impl TradeState {
    /// True for states in which a trade can be archived.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TradeState::Success | TradeState::Failed | TradeState::Abandoned
        )
    }
}

/// Our role in a trade.  Never stored; always derived from the order's
/// owning account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// We published the order being traded
    Maker,
    /// We accepted somebody else's order
    Taker,
}

/// Reference to a transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutPoint {
    /// Transaction id, hex encoded
    pub txid: String,
    /// Output index
    pub vout: u32,
}

/// Data the seller contributes to the joint transaction.
///
/// The addresses travel over the wire to the buyer; `name_output` is the
/// seller's private record of which outpoint it locked for the trade and
/// must never be sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerData {
    /// Address the updated name should be sent to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_address: Option<String>,
    /// Address the payment should be sent to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chi_address: Option<String>,
    /// The seller's current name outpoint (local only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_output: Option<OutPoint>,
}

impl SellerData {
    /// True if both addresses are present, distinct, and no private
    /// name outpoint is attached.  This is the shape seller data must
    /// have when it arrives over the wire.
    pub fn is_valid_from_wire(&self) -> bool {
        match (&self.name_address, &self.chi_address) {
            (Some(name), Some(chi)) => name != chi && self.name_output.is_none(),
            _ => false,
        }
    }
}

/// One persisted trade of the local account.
///
/// Created when an order is taken, mutated only through the negotiation
/// protocol, and moved to the archive as a [`TradeSummary`] once terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Snapshot of the order being traded (including the maker account)
    pub order: Order,
    /// When the trade was agreed
    pub start_time: DateTime<Utc>,
    /// Units actually taken (within the order's bounds)
    pub units: Amount,
    /// The other account in this trade
    pub counterparty: String,
    /// Current state
    pub state: TradeState,
    /// Seller-provided addresses and (locally) the locked name outpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_data: Option<SellerData>,
    /// The transaction as last signed or constructed by us
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub our_psbt: Option<String>,
    /// The transaction as last received from the counterparty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub their_psbt: Option<String>,
    /// Pre-signature identifier of the joint transaction, set when we
    /// move to `Pending` and used to match chain observations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub btxid: Option<String>,
}

/// Public projection of a trade, used for the external interface and for
/// the archive.  Negotiation internals (addresses, transaction parts) are
/// deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeSummary {
    /// Current (or final) state
    pub state: TradeState,
    /// When the trade was agreed
    pub start_time: DateTime<Utc>,
    /// The other account in this trade
    pub counterparty: String,
    /// Order type from our point of view
    pub order_type: OrderType,
    /// Asset being traded
    pub asset: Asset,
    /// Units taken
    pub units: Amount,
    /// Price per unit in satoshi
    pub price_sat: Amount,
    /// Our role in the trade
    pub role: Role,
}
