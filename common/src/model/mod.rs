//! Domain models for the trade engine

pub mod message;
pub mod order;
pub mod psbt;
pub mod trade;
