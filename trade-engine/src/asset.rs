//! Game-state collaborator
//!
//! What an "asset" is and who may trade how much of it is decided by the
//! game, not by the engine.  The [`AssetSpec`] trait is that boundary.

use async_trait::async_trait;

use common::model::order::{Amount, Asset};

/// Answers asset questions against the game's confirmed state.
#[async_trait]
pub trait AssetSpec: Send + Sync {
    /// The game id whose namespace the traded assets live in.
    fn game_id(&self) -> &str;

    /// True if the string denotes an asset of this game at all.
    async fn is_asset(&self, asset: &Asset) -> bool;

    /// Whether the account can currently sell the given amount.  On a
    /// positive answer, returns the hash of the block at which the answer
    /// holds; the engine verifies that block is close to the current tip.
    async fn can_sell(&self, account: &str, asset: &Asset, units: Amount) -> Option<String>;

    /// Whether the account could receive the given amount.
    async fn can_buy(&self, account: &str, asset: &Asset, units: Amount) -> bool;

    /// The move the seller's name must send to transfer the asset to the
    /// buyer.  This ends up verbatim inside the name-update value of the
    /// joint transaction.
    fn transfer_move(&self, seller: &str, buyer: &str, asset: &Asset, units: Amount)
        -> serde_json::Value;
}
