//! Direct-message payloads exchanged between trading counterparties

use serde::{Deserialize, Serialize};

use crate::model::order::{Amount, OrderId};
use crate::model::trade::SellerData;

/// Request to take one of the recipient's own orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TakingOrder {
    /// Id of the order being taken (maker-assigned)
    pub id: OrderId,
    /// Units the taker wants
    pub units: Amount,
}

/// Partially signed transaction exchanged during negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsbtPayload {
    /// Base64 psbt string
    pub psbt: String,
}

/// A direct message between the two parties of a (potential) trade.
///
/// The `counterparty` field is local bookkeeping: on outgoing messages it
/// names the recipient, on incoming messages the authenticated sender.  It
/// is filled from the transport layer, not from the serialized payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingMessage {
    /// The other account (set by the transport, not serialized)
    #[serde(skip)]
    pub counterparty: String,

    /// Identifier of the trade this message belongs to
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub identifier: String,

    /// Present when this message starts a new trade by taking an order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taking_order: Option<TakingOrder>,

    /// Seller addresses for the joint transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seller_data: Option<SellerData>,

    /// A (partially signed or unsigned) transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psbt: Option<PsbtPayload>,
}

impl ProcessingMessage {
    /// A message addressed to the given counterparty with no payload yet.
    pub fn to(counterparty: impl Into<String>) -> Self {
        ProcessingMessage {
            counterparty: counterparty.into(),
            ..Default::default()
        }
    }

    /// True if the message carries no payload worth sending.
    pub fn is_empty(&self) -> bool {
        self.identifier.is_empty()
            && self.taking_order.is_none()
            && self.seller_data.is_none()
            && self.psbt.is_none()
    }
}
