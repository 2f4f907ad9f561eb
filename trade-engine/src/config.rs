//! Configuration for the trade engine

use std::env;

use common::model::order::Amount;

/// Configuration for the trade engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fee rate passed to the wallet when funding the buyer's part of a
    /// joint transaction, in sat/vB
    pub fee_rate: u64,
    /// Amount locked into the name output of a joint transaction, in sat
    pub name_output_sat: Amount,
    /// How many blocks back from the current tip a seller's game-state
    /// answer may be and still be accepted
    pub max_block_ancestors: u64,
    /// Confirmations after which a pending trade counts as successful
    pub required_confirmations: u64,
    /// Seconds after which a trade still in negotiation is given up
    pub trade_timeout_secs: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fee_rate: env::var("TRADE_FEE_RATE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            name_output_sat: env::var("TRADE_NAME_OUTPUT_SAT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1_000_000),
            max_block_ancestors: env::var("TRADE_MAX_BLOCK_ANCESTORS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            required_confirmations: env::var("TRADE_REQUIRED_CONFIRMATIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(6),
            trade_timeout_secs: env::var("TRADE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10 * 60),
        }
    }
}

impl EngineConfig {
    /// Create a new configuration using environment variables
    pub fn from_env() -> Self {
        Self::default()
    }
}
