//! Decoded views of transactions and psbts as returned by the wallet RPC
//!
//! The engine never parses raw transaction bytes itself.  It asks the wallet
//! to decode, and works on these structural views: which outputs pay what to
//! whom, which carry a name operation, and which inputs are signed.

use serde::{Deserialize, Serialize};

use crate::model::order::Amount;

/// A transaction input, identified by the outpoint it spends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIn {
    /// Spent transaction id
    pub txid: String,
    /// Spent output index
    pub vout: u32,
}

/// A name operation attached to an output's script.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameOp {
    /// Operation type, e.g. "name_update"
    #[serde(default)]
    pub op: String,
    /// The name being operated on
    #[serde(default)]
    pub name: String,
    /// The value the name is set to
    #[serde(default)]
    pub value: String,
}

/// Decoded script of a transaction output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptPubKey {
    /// Addresses the output pays to (typically exactly one)
    #[serde(default)]
    pub addresses: Vec<String>,
    /// Name operation, if the script carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_op: Option<NameOp>,
}

/// A transaction output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOut {
    /// Amount in satoshi
    pub value_sat: Amount,
    /// Output script
    #[serde(default)]
    pub script: ScriptPubKey,
}

/// The transaction inside a decoded psbt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedTx {
    /// Inputs in transaction order
    #[serde(default)]
    pub vin: Vec<TxIn>,
    /// Outputs in transaction order
    #[serde(default)]
    pub vout: Vec<TxOut>,
}

/// Per-input psbt data the engine cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PsbtInput {
    /// Whether this input carries a (final) signature
    #[serde(default)]
    pub signed: bool,
}

/// A decoded psbt: the underlying transaction plus per-input state.
///
/// `inputs` is parallel to `tx.vin`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedPsbt {
    /// The unsigned transaction
    pub tx: DecodedTx,
    /// Per-input signing state, same order as `tx.vin`
    #[serde(default)]
    pub inputs: Vec<PsbtInput>,
}

/// Result of signing a psbt with the wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignResult {
    /// The psbt with whatever signatures the wallet could add
    pub psbt: String,
    /// True if all inputs are now signed
    pub complete: bool,
}

/// Result of finalising a psbt.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeResult {
    /// True if the psbt could be turned into a broadcastable transaction
    pub complete: bool,
    /// Raw transaction hex, present iff complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
    /// The (still partial) psbt, present iff not complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub psbt: Option<String>,
}

/// Header of a block in the chain, as far as ancestry checks need it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// Block hash
    pub hash: String,
    /// Height in the chain
    pub height: u64,
    /// Parent block hash (absent for genesis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previousblockhash: Option<String>,
    /// Child block hash (absent for the tip)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nextblockhash: Option<String>,
}

/// Status of an unspent transaction output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoStatus {
    /// Hash of the chain tip this answer is valid for
    pub best_block: String,
}
