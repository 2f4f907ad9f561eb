//! Common types for the atomic trade engine
//!
//! This library contains the shared data model and error types used by the
//! trade negotiation core and by host applications embedding it. It is pure
//! data: no I/O, no locking, no protocol logic.

pub mod error;
pub mod model;

/// Re-export important types
pub use error::{Error, Result, RpcError};
