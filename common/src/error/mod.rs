//! Error types for the trade engine
//!
//! This module provides a unified error handling system for the trade
//! negotiation core. Protocol-level rejections (a take that cannot be
//! honoured, a message that matches no trade) are ordinary error values the
//! caller logs and moves on from; they never abort the session. Failures at
//! the wallet/node boundary are carried as [`RpcError`] so callers can
//! distinguish a missing name from a transport problem.

use thiserror::Error;

/// Errors at the wallet/node RPC boundary.
///
/// The core treats any of these as a reason to abort the current
/// construction step, never as something to retry internally.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    /// The requested entity (name, block hash, psbt) is unknown
    #[error("not found: {0}")]
    NotFound(String),

    /// An argument was structurally invalid for the node
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The node could not be reached or returned garbage
    #[error("transport error: {0}")]
    Transport(String),
}

/// Trade engine error type
#[derive(Debug, Error)]
pub enum Error {
    /// The order to take is missing required fields or the requested units
    /// fall outside its bounds
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// The local order a counterparty tried to take does not exist or is
    /// already reserved for another in-flight trade
    #[error("order not available: {0}")]
    OrderUnavailable(u64),

    /// A trade where both sides would be the local account
    #[error("cannot trade with ourselves: {0}")]
    SelfTrade(String),

    /// No active trade matches the given identifier
    #[error("no matching trade: {0}")]
    TradeNotFound(String),

    /// The requested transition is not allowed in the trade's current state
    #[error("invalid trade state: {0}")]
    InvalidTradeState(String),

    /// Overflow while computing the total price of a trade
    #[error("total price overflow: {units} units at {price_sat} sat")]
    PriceOverflow { units: i64, price_sat: i64 },

    /// Error from the wallet/node RPC boundary
    #[error("wallet rpc: {0}")]
    Rpc(#[from] RpcError),

    /// Error from the game-state collaborator
    #[error("asset spec: {0}")]
    AssetSpec(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failure reading or writing the persisted state
    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
