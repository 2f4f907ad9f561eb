//! The trade manager: public surface of the negotiation engine
//!
//! [`TradeManager`] owns the shared state and drives the negotiation
//! protocol.  Incoming messages and local actions are processed in three
//! phases: mutate-and-snapshot under the state lock, wallet RPC outside any
//! lock, then re-lock and commit after re-checking that the trade is still
//! in the expected shape.  No guard is ever held across an await point.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use common::error::{Error, Result};
use common::model::message::{ProcessingMessage, PsbtPayload, TakingOrder};
use common::model::order::{Amount, Order, OrderId, OrderType, OrdersOfAccount};
use common::model::trade::{Role, SellerData, TradeRecord, TradeState, TradeSummary};

use crate::asset::AssetSpec;
use crate::checker::{xaya_name, TradeChecker};
use crate::config::EngineConfig;
use crate::rpc::WalletRpc;
use crate::state::StateHandle;
use crate::trade::{Step, TradeView, TradeViewMut};

/// Source of the current time.  A seam so tests can control trade
/// timestamps and expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// An observation about a tracked trade transaction on the blockchain,
/// reported by the host's chain watcher keyed by unsigned txid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainUpdate {
    /// The transaction is confirmed with the given depth
    Confirmed { confirmations: u64 },
    /// One of the transaction's inputs was spent by a confirmed
    /// conflicting transaction
    InputDoubleSpent,
    /// The transaction was dropped from the wallet/mempool for good
    Abandoned,
}

/// What a finished protocol step wants written back into the trade.
enum Commit {
    /// Nothing; the step decided to discard the message
    None,
    /// Our own full seller data, private name outpoint included
    SellerData(SellerData),
    /// The psbt we signed as buyer; `btxid` is set when the step also
    /// moves the trade to pending (buyer-taker)
    BuyerSigned {
        our_psbt: String,
        btxid: Option<String>,
    },
    /// The psbt we signed as seller, always pending afterwards
    SellerSigned { our_psbt: String, btxid: String },
    /// The joint transaction was broadcast
    Broadcast { btxid: String },
    /// The trade failed validation and is given up
    Abandon,
}

/// Outcome of executing one protocol step.
struct StepOutcome {
    commit: Commit,
    reply: Option<ProcessingMessage>,
}

/// Drives trades of one local account.
pub struct TradeManager {
    state: StateHandle,
    wallet: Arc<dyn WalletRpc>,
    assets: Arc<dyn AssetSpec>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl TradeManager {
    pub fn new(
        state: StateHandle,
        wallet: Arc<dyn WalletRpc>,
        assets: Arc<dyn AssetSpec>,
        config: EngineConfig,
    ) -> Self {
        Self::with_clock(state, wallet, assets, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        state: StateHandle,
        wallet: Arc<dyn WalletRpc>,
        assets: Arc<dyn AssetSpec>,
        config: EngineConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        TradeManager {
            state,
            wallet,
            assets,
            config,
            clock,
        }
    }

    /// The local account name.
    pub fn account(&self) -> String {
        self.state.read().account.clone()
    }

    // Own orders

    /// Adds an own order and returns its id.
    pub fn add_order(&self, order: Order) -> Result<OrderId> {
        let id = self.state.write().add_order(order);
        self.state.persist()?;
        Ok(id)
    }

    /// Cancels an own order.  Locked orders cannot be cancelled.
    pub fn cancel_order(&self, id: OrderId) -> Result<bool> {
        let removed = self.state.write().remove_order(id);
        if removed {
            self.state.persist()?;
        }
        Ok(removed)
    }

    /// The own orders to broadcast, locked ones withheld.
    pub fn orders_for_broadcast(&self) -> OrdersOfAccount {
        self.state.read().orders_for_broadcast()
    }

    // Starting trades

    /// Takes an order somebody else published.  On success, the trade is
    /// recorded and the returned message must be delivered to the maker.
    ///
    /// If we end up as the seller, the seller data (fresh addresses and
    /// our name outpoint) is created before anything is recorded; if the
    /// wallet fails, no trade comes into existence at all.
    pub async fn take_order(&self, order: &Order, units: Amount) -> Result<ProcessingMessage> {
        let account = self.account();

        check_order(order, units)?;
        let maker = order.account.clone().unwrap_or_default();
        if maker == account {
            return Err(Error::SelfTrade(maker));
        }

        let maker_type = order
            .order_type
            .ok_or_else(|| Error::InvalidOrder("missing order type".into()))?;
        let order_id = order.id.unwrap_or_default();
        let identifier = format!("{maker}\n{order_id}");

        {
            let state = self.state.read();
            let dup = state
                .trades
                .iter()
                .map(|r| TradeView::new(r, &state.account))
                .any(|v| !v.is_finalised() && v.identifier() == identifier);
            if dup {
                return Err(Error::InvalidTradeState(format!(
                    "already trading on {identifier:?}"
                )));
            }
        }

        // Taking a bid means we deliver the asset.
        let seller_data = if maker_type == OrderType::Bid {
            Some(self.create_seller_data(&account).await?)
        } else {
            None
        };

        let record = TradeRecord {
            order: order.clone(),
            start_time: self.clock.now(),
            units,
            counterparty: maker.clone(),
            state: TradeState::Initiated,
            seller_data: seller_data.clone(),
            our_psbt: None,
            their_psbt: None,
            btxid: None,
        };
        self.state.write().trades.push(record);
        self.state.persist()?;

        info!(%identifier, units, "taking order");

        let mut msg = ProcessingMessage::to(maker);
        msg.identifier = identifier;
        msg.taking_order = Some(TakingOrder {
            id: order_id,
            units,
        });
        msg.seller_data = seller_data.map(wire_seller_data);
        Ok(msg)
    }

    /// Fresh addresses plus our current name outpoint.
    async fn create_seller_data(&self, account: &str) -> Result<SellerData> {
        let name_address = self.wallet.new_address().await?;
        let chi_address = self.wallet.new_address().await?;
        let name_output = self.wallet.name_outpoint(&xaya_name(account)).await?;
        Ok(SellerData {
            name_address: Some(name_address),
            chi_address: Some(chi_address),
            name_output: Some(name_output),
        })
    }

    /// A counterparty wants to take one of our own orders.  Locks the
    /// order and records the trade; on validation failure the lock is
    /// released again.  Returns the trade identifier.
    fn order_taken(&self, msg: &ProcessingMessage, taking: &TakingOrder) -> Result<String> {
        let mut state = self.state.write();

        if msg.counterparty == state.account {
            return Err(Error::SelfTrade(msg.counterparty.clone()));
        }

        let Some(order) = state.try_lock_order(taking.id) else {
            return Err(Error::OrderUnavailable(taking.id));
        };

        if let Err(err) = check_order(&order, taking.units) {
            state.unlock_order(taking.id);
            return Err(err);
        }

        // The very first message of a trade may omit the identifier; it
        // is implied by the order being taken.
        let expected_identifier = format!("{}\n{}", state.account, taking.id);
        if !msg.identifier.is_empty() && msg.identifier != expected_identifier {
            state.unlock_order(taking.id);
            return Err(Error::InvalidOrder(format!(
                "identifier {:?} does not match taken order",
                msg.identifier
            )));
        }

        info!(id = taking.id, units = taking.units,
              counterparty = %msg.counterparty, "own order taken");

        let record = TradeRecord {
            order,
            start_time: self.clock.now(),
            units: taking.units,
            counterparty: msg.counterparty.clone(),
            state: TradeState::Initiated,
            seller_data: None,
            our_psbt: None,
            their_psbt: None,
            btxid: None,
        };
        state.trades.push(record);
        Ok(expected_identifier)
    }

    // Message processing

    /// Processes a message from a counterparty.  Returns the reply to
    /// send back, if the protocol calls for one.  Messages that match no
    /// trade are dropped silently.
    pub async fn process_message(
        &self,
        msg: &ProcessingMessage,
    ) -> Result<Option<ProcessingMessage>> {
        let mut msg = msg.clone();
        if let Some(taking) = &msg.taking_order {
            msg.identifier = self.order_taken(&msg, taking)?;
            self.state.persist()?;
        }
        let msg = &msg;

        // Phase one: merge the message and snapshot the trade.
        let snapshot = {
            let mut state = self.state.write();
            let account = state.account.clone();

            let mut matches = Vec::new();
            for (idx, record) in state.trades.iter().enumerate() {
                if TradeView::new(record, &account).matches(msg) {
                    matches.push(idx);
                }
            }
            assert!(matches.len() <= 1, "several trades match one identifier");

            match matches.first() {
                None => {
                    debug!(identifier = %msg.identifier, "message matches no trade");
                    return Ok(None);
                }
                Some(&idx) => {
                    let record = &mut state.trades[idx];
                    TradeViewMut::new(record, &account).handle_message(msg);
                    (record.clone(), account)
                }
            }
        };
        self.state.persist()?;

        let (record, account) = snapshot;
        let view = TradeView::new(&record, &account);
        let Some(step) = view.next_step() else {
            return Ok(None);
        };

        // Phase two: wallet work, no locks held.
        let outcome = self.execute_step(&record, &account, step).await?;

        // Phase three: re-lock, re-check, commit.
        self.commit_step(&record, &account, step, outcome.commit)?;
        Ok(outcome.reply)
    }

    async fn execute_step(
        &self,
        record: &TradeRecord,
        account: &str,
        step: Step,
    ) -> Result<StepOutcome> {
        let view = TradeView::new(record, account);
        match step {
            Step::PublishSellerData => {
                let sd = self.create_seller_data(account).await?;
                let mut reply = ProcessingMessage::to(record.counterparty.clone());
                reply.identifier = view.identifier();
                reply.seller_data = Some(wire_seller_data(sd.clone()));
                Ok(StepOutcome {
                    commit: Commit::SellerData(sd),
                    reply: Some(reply),
                })
            }
            Step::ConstructBuyerTx => self.construct_as_buyer(record, account).await,
            Step::SignAsSeller => self.sign_as_seller(record, account).await,
            Step::CombineAndBroadcast => self.combine_and_broadcast(record, account).await,
        }
    }

    fn checker_for(&self, view: &TradeView<'_>) -> Result<TradeChecker> {
        let (buyer, seller) = view.buyer_and_seller();
        let record = view.record();
        let asset = record
            .order
            .asset
            .clone()
            .ok_or_else(|| Error::InvalidOrder("missing asset".into()))?;
        let price_sat = record
            .order
            .price_sat
            .ok_or_else(|| Error::InvalidOrder("missing price".into()))?;
        Ok(TradeChecker::new(
            Arc::clone(&self.assets),
            Arc::clone(&self.wallet),
            self.config.clone(),
            buyer,
            seller,
            asset,
            price_sat,
            record.units,
        ))
    }

    /// Buyer side: validate the trade against the chain and game state,
    /// build the joint transaction and sign our inputs.  As maker we hand
    /// the counterparty the unsigned transaction and hold back our
    /// signatures until theirs arrive; as taker we sign first.
    async fn construct_as_buyer(&self, record: &TradeRecord, account: &str) -> Result<StepOutcome> {
        let view = TradeView::new(record, account);
        let checker = self.checker_for(&view)?;

        let Some(name_input) = checker.check_for_buyer_trade().await? else {
            warn!(identifier = %view.identifier(), "buyer-side check failed, abandoning");
            return Ok(StepOutcome {
                commit: Commit::Abandon,
                reply: None,
            });
        };

        let sd = record
            .seller_data
            .as_ref()
            .ok_or_else(|| Error::InvalidTradeState("buyer step without seller data".into()))?;

        let unsigned = checker.construct_transaction(sd, &name_input).await?;
        let signed = self.wallet.sign_psbt(&unsigned).await?;

        let before = self.wallet.decode_psbt(&unsigned).await?;
        let after = self.wallet.decode_psbt(&signed.psbt).await?;
        if !checker.check_for_buyer_signature(&before, &after) {
            warn!(identifier = %view.identifier(), "wallet signed unexpected inputs");
            return Ok(StepOutcome {
                commit: Commit::None,
                reply: None,
            });
        }

        let mut reply = ProcessingMessage::to(record.counterparty.clone());
        reply.identifier = view.identifier();

        match view.role() {
            // The maker must not reveal signatures before the taker
            // commits theirs.
            Role::Maker => {
                reply.psbt = Some(PsbtPayload { psbt: unsigned });
                Ok(StepOutcome {
                    commit: Commit::BuyerSigned {
                        our_psbt: signed.psbt,
                        btxid: None,
                    },
                    reply: Some(reply),
                })
            }
            Role::Taker => {
                let btxid = self.wallet.unsigned_txid(&signed.psbt).await?;
                reply.psbt = Some(PsbtPayload {
                    psbt: signed.psbt.clone(),
                });
                Ok(StepOutcome {
                    commit: Commit::BuyerSigned {
                        our_psbt: signed.psbt,
                        btxid: Some(btxid),
                    },
                    reply: Some(reply),
                })
            }
        }
    }

    /// Seller side: verify the received transaction pays us correctly,
    /// sign our name input and either broadcast (maker, whose signature
    /// completes the transaction) or return the partial (taker).  A
    /// transaction violating expectations is discarded without touching
    /// the trade.
    async fn sign_as_seller(&self, record: &TradeRecord, account: &str) -> Result<StepOutcome> {
        let view = TradeView::new(record, account);
        let checker = self.checker_for(&view)?;

        let discard = StepOutcome {
            commit: Commit::None,
            reply: None,
        };

        let sd = record
            .seller_data
            .as_ref()
            .ok_or_else(|| Error::InvalidTradeState("seller step without seller data".into()))?;
        let theirs = record
            .their_psbt
            .as_ref()
            .ok_or_else(|| Error::InvalidTradeState("seller step without psbt".into()))?;

        let before = self.wallet.decode_psbt(theirs).await?;
        if !checker.check_for_seller_outputs(&before, sd)? {
            warn!(identifier = %view.identifier(), "received transaction does not pay us");
            return Ok(discard);
        }

        let signed = self.wallet.sign_psbt(theirs).await?;
        let after = self.wallet.decode_psbt(&signed.psbt).await?;
        if !checker.check_for_seller_signature(&before, &after, sd) {
            warn!(identifier = %view.identifier(), "wallet signed unexpected inputs");
            return Ok(discard);
        }

        let fin = self.wallet.finalize_psbt(&signed.psbt).await?;

        match view.role() {
            // As maker we sign last: our signature must complete the
            // transaction, and we broadcast it ourselves.
            Role::Maker => {
                let Some(hex) = fin.complete.then_some(fin.hex).flatten() else {
                    warn!(
                        identifier = %view.identifier(),
                        "transaction incomplete after our signature; counterparty signed out of order"
                    );
                    return Ok(discard);
                };

                let btxid = self.wallet.unsigned_txid(&signed.psbt).await?;
                let txid = self.wallet.send_raw_transaction(&hex).await?;
                info!(identifier = %view.identifier(), %txid, "trade transaction broadcast");

                Ok(StepOutcome {
                    commit: Commit::SellerSigned {
                        our_psbt: signed.psbt,
                        btxid,
                    },
                    reply: None,
                })
            }
            // As taker we sign first: the result must still be missing
            // the maker's signatures.
            Role::Taker => {
                if fin.complete {
                    // A zero-total transaction has no buyer inputs, so
                    // our name signature alone legitimately completes
                    // it.  We are the final signer then and broadcast.
                    if checker.total_sat()? != 0 {
                        warn!(
                            identifier = %view.identifier(),
                            "transaction already complete; maker signed out of order"
                        );
                        return Ok(discard);
                    }
                    let Some(hex) = fin.hex else {
                        warn!(identifier = %view.identifier(), "complete psbt without raw tx");
                        return Ok(discard);
                    };

                    let btxid = self.wallet.unsigned_txid(&signed.psbt).await?;
                    let txid = self.wallet.send_raw_transaction(&hex).await?;
                    info!(identifier = %view.identifier(), %txid, "trade transaction broadcast");

                    let mut reply = ProcessingMessage::to(record.counterparty.clone());
                    reply.identifier = view.identifier();
                    reply.psbt = Some(PsbtPayload {
                        psbt: signed.psbt.clone(),
                    });
                    return Ok(StepOutcome {
                        commit: Commit::SellerSigned {
                            our_psbt: signed.psbt,
                            btxid,
                        },
                        reply: Some(reply),
                    });
                }
                let partial = fin.psbt.unwrap_or(signed.psbt);

                let btxid = self.wallet.unsigned_txid(&partial).await?;
                let mut reply = ProcessingMessage::to(record.counterparty.clone());
                reply.identifier = view.identifier();
                reply.psbt = Some(PsbtPayload {
                    psbt: partial.clone(),
                });

                Ok(StepOutcome {
                    commit: Commit::SellerSigned {
                        our_psbt: partial,
                        btxid,
                    },
                    reply: Some(reply),
                })
            }
        }
    }

    /// Buyer-maker holding both partial transactions: merge the
    /// signatures and broadcast if that completes the transaction.
    async fn combine_and_broadcast(
        &self,
        record: &TradeRecord,
        account: &str,
    ) -> Result<StepOutcome> {
        let view = TradeView::new(record, account);

        let (Some(ours), Some(theirs)) = (&record.our_psbt, &record.their_psbt) else {
            return Err(Error::InvalidTradeState("combine step without psbts".into()));
        };

        let combined = self
            .wallet
            .combine_psbts(&[ours.clone(), theirs.clone()])
            .await?;
        let fin = self.wallet.finalize_psbt(&combined).await?;

        let Some(hex) = fin.complete.then_some(fin.hex).flatten() else {
            warn!(identifier = %view.identifier(), "combined transaction still incomplete");
            return Ok(StepOutcome {
                commit: Commit::None,
                reply: None,
            });
        };

        let btxid = self.wallet.unsigned_txid(&combined).await?;
        let txid = self.wallet.send_raw_transaction(&hex).await?;
        info!(identifier = %view.identifier(), %txid, "trade transaction broadcast");

        Ok(StepOutcome {
            commit: Commit::Broadcast { btxid },
            reply: None,
        })
    }

    /// Writes a step's result back, provided the trade is still in the
    /// shape the step was computed from.  A concurrent change (another
    /// message, an expiry) voids the commit.
    fn commit_step(
        &self,
        snapshot: &TradeRecord,
        account: &str,
        step: Step,
        commit: Commit,
    ) -> Result<()> {
        if matches!(commit, Commit::None) {
            return Ok(());
        }

        {
            let mut state = self.state.write();
            let identifier = TradeView::new(snapshot, account).identifier();

            let record = state.trades.iter_mut().find(|r| {
                let v = TradeView::new(r, account);
                !v.is_finalised()
                    && v.identifier() == identifier
                    && r.counterparty == snapshot.counterparty
            });
            let Some(record) = record else {
                warn!(%identifier, "trade vanished before commit");
                return Ok(());
            };

            if record.state != TradeState::Initiated
                || TradeView::new(record, account).next_step() != Some(step)
            {
                warn!(%identifier, "trade changed before commit; dropping result");
                return Ok(());
            }

            match commit {
                Commit::None => unreachable!(),
                Commit::SellerData(sd) => {
                    TradeViewMut::new(record, account).set_own_seller_data(sd)
                }
                Commit::BuyerSigned { our_psbt, btxid } => {
                    let mut view = TradeViewMut::new(record, account);
                    view.set_our_psbt(our_psbt);
                    if let Some(btxid) = btxid {
                        view.set_pending(btxid);
                    }
                }
                Commit::SellerSigned { our_psbt, btxid } => {
                    let mut view = TradeViewMut::new(record, account);
                    view.set_our_psbt(our_psbt);
                    view.set_pending(btxid);
                }
                Commit::Broadcast { btxid } => {
                    TradeViewMut::new(record, account).set_pending(btxid)
                }
                Commit::Abandon => {
                    TradeViewMut::new(record, account).set_abandoned();
                    unlock_if_maker(&mut state, snapshot, account);
                }
            }
        }

        self.state.persist()
    }

    // Lifecycle

    /// All trades, active ones first, then the archive.
    pub fn get_trades(&self) -> Vec<TradeSummary> {
        let state = self.state.read();
        let mut result: Vec<TradeSummary> = state
            .trades
            .iter()
            .map(|r| TradeView::new(r, &state.account).public_info())
            .collect();
        result.extend(state.archive.iter().cloned());
        result
    }

    /// Moves finished trades into the archive, keeping only their public
    /// summaries.  Idempotent.
    pub fn archive_finalised_trades(&self) -> Result<()> {
        let mut archived = 0;
        {
            let mut state = self.state.write();
            let account = state.account.clone();

            let mut remaining = Vec::with_capacity(state.trades.len());
            for record in std::mem::take(&mut state.trades) {
                let view = TradeView::new(&record, &account);
                if view.is_finalised() {
                    state.archive.push(view.public_info());
                    archived += 1;
                } else {
                    remaining.push(record);
                }
            }
            state.trades = remaining;
        }

        if archived > 0 {
            debug!(archived, "archived finished trades");
            self.state.persist()?;
        }
        Ok(())
    }

    /// Gives up a trade that is still in negotiation.  Trades that have
    /// already shared signatures cannot be abandoned unilaterally.
    pub fn abandon_trade(&self, identifier: &str) -> Result<()> {
        {
            let mut state = self.state.write();
            let account = state.account.clone();

            let idx = state
                .trades
                .iter()
                .position(|r| {
                    let v = TradeView::new(r, &account);
                    !v.is_finalised() && v.identifier() == identifier
                })
                .ok_or_else(|| Error::TradeNotFound(identifier.to_string()))?;

            if state.trades[idx].state != TradeState::Initiated {
                return Err(Error::InvalidTradeState(format!(
                    "trade {identifier:?} is no longer in negotiation"
                )));
            }

            let snapshot = state.trades[idx].clone();
            TradeViewMut::new(&mut state.trades[idx], &account).set_abandoned();
            unlock_if_maker(&mut state, &snapshot, &account);
            info!(%identifier, "trade abandoned");
        }
        self.state.persist()
    }

    /// Abandons trades that have been in negotiation longer than the
    /// configured timeout.
    pub fn expire_trades(&self) -> Result<()> {
        let cutoff = self.clock.now() - chrono::Duration::seconds(self.config.trade_timeout_secs);
        let mut expired = 0;
        {
            let mut state = self.state.write();
            let account = state.account.clone();

            for idx in 0..state.trades.len() {
                let record = &state.trades[idx];
                if record.state != TradeState::Initiated || record.start_time > cutoff {
                    continue;
                }
                let snapshot = record.clone();
                TradeViewMut::new(&mut state.trades[idx], &account).set_abandoned();
                unlock_if_maker(&mut state, &snapshot, &account);
                expired += 1;
            }
        }

        if expired > 0 {
            info!(expired, "expired stale trades");
            self.state.persist()?;
        }
        Ok(())
    }

    /// Applies a chain observation to the pending trade tracking the
    /// given unsigned txid.
    pub fn on_chain_update(&self, btxid: &str, update: ChainUpdate) -> Result<()> {
        let mut changed = false;
        {
            let mut state = self.state.write();
            let account = state.account.clone();

            for idx in 0..state.trades.len() {
                let record = &state.trades[idx];
                if record.state != TradeState::Pending || record.btxid.as_deref() != Some(btxid) {
                    continue;
                }

                let new_state = match update {
                    ChainUpdate::Confirmed { confirmations } => {
                        if confirmations < self.config.required_confirmations {
                            continue;
                        }
                        TradeState::Success
                    }
                    ChainUpdate::InputDoubleSpent => TradeState::Failed,
                    ChainUpdate::Abandoned => TradeState::Abandoned,
                };

                info!(%btxid, ?new_state, "pending trade resolved");
                let snapshot = state.trades[idx].clone();
                state.trades[idx].state = new_state;
                unlock_if_maker(&mut state, &snapshot, &account);
                changed = true;
            }
        }

        if changed {
            self.state.persist()?;
        }
        Ok(())
    }
}

/// Releases the order lock held for a trade that just ended, if we were
/// the maker.
fn unlock_if_maker(state: &mut crate::state::State, record: &TradeRecord, account: &str) {
    if TradeView::new(record, account).role() != Role::Maker {
        return;
    }
    if let Some(id) = record.order.id {
        state.unlock_order(id);
    }
}

/// The seller data as sent over the wire: addresses only, never the
/// private name outpoint.
fn wire_seller_data(sd: SellerData) -> SellerData {
    SellerData {
        name_output: None,
        ..sd
    }
}

/// Validates an order somebody wants to trade on: all protocol-relevant
/// fields present and the requested units within its bounds.
fn check_order(order: &Order, units: Amount) -> Result<()> {
    if order.account.as_deref().map_or(true, str::is_empty) {
        return Err(Error::InvalidOrder("missing account".into()));
    }
    if order.id.is_none() {
        return Err(Error::InvalidOrder("missing id".into()));
    }
    if order.asset.as_deref().map_or(true, str::is_empty) {
        return Err(Error::InvalidOrder("missing asset".into()));
    }
    if order.order_type.is_none() {
        return Err(Error::InvalidOrder("missing order type".into()));
    }
    let Some(price) = order.price_sat else {
        return Err(Error::InvalidOrder("missing price".into()));
    };
    if price < 0 {
        return Err(Error::InvalidOrder("negative price".into()));
    }

    if units <= 0 {
        return Err(Error::InvalidOrder("units must be positive".into()));
    }
    let min = order.min_units.unwrap_or(1);
    let max = order.max_units.unwrap_or(min);
    if units < min || units > max {
        return Err(Error::InvalidOrder(format!(
            "units {units} outside [{min}, {max}]"
        )));
    }

    Ok(())
}
