//! Views onto a single trade
//!
//! A trade is stored as a plain [`TradeRecord`]; all interpretation (our
//! role, whether we buy or sell, what the protocol wants us to do next)
//! lives in the read view [`TradeView`] and the write view [`TradeViewMut`].
//! Read-only call sites cannot accidentally mutate a trade, the type system
//! rules it out.

use tracing::{debug, warn};

use common::model::message::{ProcessingMessage, PsbtPayload};
use common::model::order::{Amount, OrderType};
use common::model::trade::{Role, SellerData, TradeRecord, TradeState, TradeSummary};

/// The next protocol action a trade asks of us.  Computed from a snapshot
/// under the state lock; the actual RPC work happens outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// We are the seller and have not yet provided our addresses
    PublishSellerData,
    /// We are the buyer, have the seller's addresses and must build and
    /// sign our part of the transaction
    ConstructBuyerTx,
    /// We are the seller and have received a transaction to verify and
    /// sign
    SignAsSeller,
    /// We are the buyer-maker holding both partial transactions and can
    /// combine and broadcast
    CombineAndBroadcast,
}

/// Read-only view of a trade from the local account's perspective.
#[derive(Clone, Copy)]
pub struct TradeView<'a> {
    record: &'a TradeRecord,
    account: &'a str,
}

impl<'a> TradeView<'a> {
    pub fn new(record: &'a TradeRecord, account: &'a str) -> Self {
        TradeView { record, account }
    }

    pub fn record(&self) -> &'a TradeRecord {
        self.record
    }

    /// Our role: maker if the underlying order is ours.
    pub fn role(&self) -> Role {
        if self.record.order.account.as_deref() == Some(self.account) {
            Role::Maker
        } else {
            Role::Taker
        }
    }

    /// The order type from our point of view.  The stored order always
    /// carries the maker's type; a taker sees the opposite.
    pub fn order_type(&self) -> OrderType {
        let maker_type = self.record.order.order_type.unwrap_or(OrderType::Bid);
        match self.role() {
            Role::Maker => maker_type,
            Role::Taker => maker_type.opposite(),
        }
    }

    /// True if we are the one giving up the asset.
    pub fn we_are_seller(&self) -> bool {
        self.order_type() == OrderType::Ask
    }

    /// The buyer and seller accounts, in that order.
    pub fn buyer_and_seller(&self) -> (String, String) {
        let me = self.account.to_string();
        let them = self.record.counterparty.clone();
        if self.we_are_seller() {
            (them, me)
        } else {
            (me, them)
        }
    }

    /// Identifier of the trade, unique among all trades of this maker.
    /// Account names cannot contain newlines, so the concatenation is
    /// injective.
    pub fn identifier(&self) -> String {
        let maker = match self.role() {
            Role::Maker => self.account,
            Role::Taker => self.record.order.account.as_deref().unwrap_or_default(),
        };
        let id = self.record.order.id.unwrap_or_default();
        format!("{maker}\n{id}")
    }

    /// True once the trade reached a terminal state.
    pub fn is_finalised(&self) -> bool {
        self.record.state.is_terminal()
    }

    /// True if the given message addresses this trade.
    pub fn matches(&self, msg: &ProcessingMessage) -> bool {
        !self.is_finalised()
            && self.record.counterparty == msg.counterparty
            && self.identifier() == msg.identifier
    }

    /// The public projection of the trade.
    pub fn public_info(&self) -> TradeSummary {
        TradeSummary {
            state: self.record.state,
            start_time: self.record.start_time,
            counterparty: self.record.counterparty.clone(),
            order_type: self.order_type(),
            asset: self.record.order.asset.clone().unwrap_or_default(),
            units: self.record.units,
            price_sat: self.record.order.price_sat.unwrap_or_default(),
            role: self.role(),
        }
    }

    /// The next protocol action for this trade, if any.  Only trades
    /// still in negotiation have one.
    pub fn next_step(&self) -> Option<Step> {
        if self.record.state != TradeState::Initiated {
            return None;
        }

        let seller = self.we_are_seller();

        if seller && self.record.seller_data.is_none() {
            return Some(Step::PublishSellerData);
        }

        if !seller && self.record.seller_data.is_some() && self.record.our_psbt.is_none() {
            return Some(Step::ConstructBuyerTx);
        }

        if seller
            && self
                .record
                .seller_data
                .as_ref()
                .is_some_and(|sd| sd.name_output.is_some())
            && self.record.their_psbt.is_some()
            && self.record.our_psbt.is_none()
        {
            return Some(Step::SignAsSeller);
        }

        if !seller
            && self.role() == Role::Maker
            && self.record.our_psbt.is_some()
            && self.record.their_psbt.is_some()
        {
            return Some(Step::CombineAndBroadcast);
        }

        None
    }
}

/// Mutable view of a trade.  All state changes of an existing trade go
/// through here.
pub struct TradeViewMut<'a> {
    record: &'a mut TradeRecord,
    account: &'a str,
}

impl<'a> TradeViewMut<'a> {
    pub fn new(record: &'a mut TradeRecord, account: &'a str) -> Self {
        TradeViewMut { record, account }
    }

    pub fn as_view(&self) -> TradeView<'_> {
        TradeView::new(self.record, self.account)
    }

    /// Merges an incoming message's payloads into the trade, subject to
    /// the protocol rules.  Payloads that do not apply are dropped
    /// without changing anything.
    pub fn handle_message(&mut self, msg: &ProcessingMessage) {
        if self.record.state != TradeState::Initiated {
            debug!("ignoring message for trade no longer in negotiation");
            return;
        }

        if let Some(sd) = &msg.seller_data {
            self.merge_seller_data(sd);
        }

        if let Some(payload) = &msg.psbt {
            self.merge_psbt(payload);
        }
    }

    /// Accepts seller data only if we are the buyer, do not have any yet,
    /// and the data has the valid wire shape (both addresses present and
    /// distinct, no private name outpoint attached).
    fn merge_seller_data(&mut self, sd: &SellerData) {
        if self.as_view().we_are_seller() {
            warn!("received seller data but we are the seller; dropping");
            return;
        }
        if self.record.seller_data.is_some() {
            warn!("already have seller data; dropping");
            return;
        }
        if !sd.is_valid_from_wire() {
            warn!("received malformed seller data; dropping");
            return;
        }

        self.record.seller_data = Some(sd.clone());
    }

    /// Stores the counterparty's psbt, once.
    fn merge_psbt(&mut self, payload: &PsbtPayload) {
        if self.record.their_psbt.is_some() {
            warn!("already have the counterparty's psbt; dropping");
            return;
        }
        self.record.their_psbt = Some(payload.psbt.clone());
    }

    /// Records the seller data we created ourselves (including the
    /// private name outpoint).
    pub fn set_own_seller_data(&mut self, sd: SellerData) {
        self.record.seller_data = Some(sd);
    }

    /// Records the transaction as signed or constructed by us.
    pub fn set_our_psbt(&mut self, psbt: String) {
        self.record.our_psbt = Some(psbt);
    }

    /// Moves the trade into the pending state, remembering the unsigned
    /// txid for on-chain tracking.
    pub fn set_pending(&mut self, btxid: String) {
        self.record.state = TradeState::Pending;
        self.record.btxid = Some(btxid);
    }

    /// Marks the trade abandoned.
    pub fn set_abandoned(&mut self) {
        self.record.state = TradeState::Abandoned;
    }

    pub fn units(&self) -> Amount {
        self.record.units
    }
}
