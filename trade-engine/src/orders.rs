//! Registry of the local account's own orders
//!
//! Own orders live inside the shared [`State`](crate::state::State).  While
//! a counterparty negotiates against one of them, the order is locked: it is
//! left out of broadcasts and cannot be taken a second time.

use tracing::debug;

use common::model::order::{Order, OrderId, OrdersOfAccount};

use crate::state::State;

impl State {
    /// Adds a new own order and returns its assigned id.  The `account`
    /// and `id` fields of the stored order are left unset; they are
    /// implied by the state itself.
    pub fn add_order(&mut self, mut order: Order) -> OrderId {
        let id = self.next_free_id;
        self.next_free_id += 1;

        order.account = None;
        order.id = None;
        order.locked = false;
        self.own_orders.insert(id, order);

        debug!(id, "added own order");
        id
    }

    /// Removes an own order.  Returns false if no order with that id
    /// exists or it is currently locked.
    pub fn remove_order(&mut self, id: OrderId) -> bool {
        match self.own_orders.get(&id) {
            Some(order) if !order.locked => {
                self.own_orders.remove(&id);
                true
            }
            _ => false,
        }
    }

    /// Tries to reserve an own order for an in-flight trade.  On success,
    /// marks it locked and returns a copy with `account` and `id` filled
    /// in.  Returns `None` if the order does not exist or is already
    /// locked.
    pub fn try_lock_order(&mut self, id: OrderId) -> Option<Order> {
        let account = self.account.clone();
        let order = self.own_orders.get_mut(&id)?;
        if order.locked {
            return None;
        }
        order.locked = true;

        let mut copy = order.clone();
        copy.account = Some(account);
        copy.id = Some(id);
        Some(copy)
    }

    /// Releases a previously locked order.  Unknown ids are ignored,
    /// since the order may have been removed while the trade ran.
    pub fn unlock_order(&mut self, id: OrderId) {
        if let Some(order) = self.own_orders.get_mut(&id) {
            order.locked = false;
        }
    }

    /// The orders to broadcast to the orderbook channel.  Locked orders
    /// are withheld.
    pub fn orders_for_broadcast(&self) -> OrdersOfAccount {
        OrdersOfAccount {
            account: self.account.clone(),
            orders: self
                .own_orders
                .iter()
                .filter(|(_, o)| !o.locked)
                .map(|(id, o)| (*id, o.clone()))
                .collect(),
        }
    }
}
