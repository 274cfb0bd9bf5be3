use log::*;

use infra::persistence::Storage;

use super::models::Order;
use crate::error::{Error, Result};

/// The confirmed orders, as loaded from storage plus anything appended since.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderLedger {
    orders: Vec<Order>,
}

/// `max + 1`, or `1` for an empty ledger. Insertion order does not matter.
pub fn next_order_id(existing: &[Order]) -> Result<u64> {
    match existing.iter().map(|o| o.order_id).max() {
        None => Ok(1),
        Some(last) => last.checked_add(1).ok_or(Error::IdsExhausted {
            kind: "order",
            last,
        }),
    }
}

impl OrderLedger {
    pub fn new(orders: Vec<Order>) -> Self {
        OrderLedger { orders }
    }

    pub fn load<S: Storage>(store: &S) -> Result<Self> {
        let orders = store.load::<Order>()?;
        Ok(OrderLedger { orders })
    }

    pub fn save<S: Storage>(&self, store: &S) -> Result<()> {
        store.save(&self.orders)?;
        Ok(())
    }

    pub fn next_order_id(&self) -> Result<u64> {
        next_order_id(&self.orders)
    }

    pub fn append(&mut self, order: Order) {
        debug!("Appending order {} to ledger", order.order_id);
        self.orders.push(order);
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn for_user<'a>(&'a self, user_id: &'a str) -> impl 'a + Iterator<Item = &'a Order> {
        self.orders.iter().filter(move |o| o.user_id == user_id)
    }
}
