//! Negotiation core for trustless atomic trades of game assets
//!
//! Accounts trade blockchain-game assets for coin through a single joint
//! transaction that moves both at once: the seller's name output carries
//! the in-game transfer move, the buyer's inputs pay the price.  Neither
//! side ever holds the other's funds, and a trade either confirms entirely
//! or not at all.
//!
//! The crate is transport-agnostic: the host application delivers
//! [`ProcessingMessage`](common::model::message::ProcessingMessage)s
//! between the two parties, feeds chain observations into the
//! [`TradeManager`](manager::TradeManager) and broadcasts the order book.

pub mod asset;
pub mod checker;
pub mod config;
pub mod manager;
pub mod orders;
pub mod rpc;
pub mod state;
pub mod trade;

pub use asset::AssetSpec;
pub use config::EngineConfig;
pub use manager::{ChainUpdate, Clock, SystemClock, TradeManager};
pub use rpc::{RpcResult, WalletRpc};
pub use state::{State, StateHandle};
