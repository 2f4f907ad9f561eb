//! Order models and related types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Identifier of an order, unique per owning account
pub type OrderId = u64;

/// An amount of asset units or satoshi
pub type Amount = i64;

/// A tradable asset, with implementation-defined meaning
pub type Asset = String;

/// Order type (buy or sell, from the maker's point of view)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    /// The maker buys the asset
    Bid,
    /// The maker sells the asset
    Ask,
}

impl OrderType {
    /// The type an order has when seen from the other side of the trade.
    pub fn opposite(self) -> Self {
        match self {
            OrderType::Bid => OrderType::Ask,
            OrderType::Ask => OrderType::Bid,
        }
    }
}

/// An offer published to the orderbook.
///
/// Orders received over the broadcast channel are untrusted input, so every
/// field the protocol relies on is optional here and checked for presence
/// before a trade can be seeded from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Account that published the order (the maker)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// Maker-assigned order id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrderId>,
    /// Asset being traded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset: Option<Asset>,
    /// Whether the maker buys or sells
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
    /// Smallest number of units a taker may take
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_units: Option<Amount>,
    /// Largest number of units a taker may take
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_units: Option<Amount>,
    /// Price per unit in satoshi
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_sat: Option<Amount>,
    /// Set while the order is reserved for an in-flight trade.  Locked
    /// orders are not broadcast and cannot be taken again.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
}

/// The orders of one account, as broadcast to the orderbook channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersOfAccount {
    /// The owning account
    pub account: String,
    /// Orders keyed by their id.  The entries do not repeat the account
    /// or id fields; they are implied by the map and its owner.
    #[serde(default)]
    pub orders: BTreeMap<OrderId, Order>,
}
