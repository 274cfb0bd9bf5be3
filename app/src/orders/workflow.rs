//! Placing an order: lines are added while `Building`, the cart is shown
//! while `Reviewing`, and the customer's answer either confirms or cancels.
//!
//! Stock is reserved in memory as each line is added. The menu and the ledger
//! are only written when the order is confirmed.

use chrono::{Local, NaiveDateTime};
use log::*;
use rust_decimal::Decimal;

use infra::persistence::Storage;

use super::ledger::OrderLedger;
use super::models::{Order, OrderLine, TIMESTAMP_FORMAT, TOO_LARGE};
use crate::error::{Error, Result};
use crate::menu::MenuCatalog;

/// Typed by the customer to stop adding lines.
pub const DONE: &str = "done";

#[derive(Debug)]
pub struct Building<'s, S> {
    store: &'s S,
    user_id: String,
    loaded: MenuCatalog,
    catalog: MenuCatalog,
    cart: Vec<OrderLine>,
    total: Decimal,
}

/// A non-empty cart waiting for a yes/no answer.
#[derive(Debug)]
pub struct Reviewing<'s, S> {
    store: &'s S,
    user_id: String,
    loaded: MenuCatalog,
    catalog: MenuCatalog,
    cart: Vec<OrderLine>,
    total: Decimal,
}

#[derive(Debug)]
pub enum Finished<'s, S> {
    Review(Reviewing<'s, S>),
    EmptyCart,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Confirmed(Order),
    Cancelled,
    EmptyCart,
}

pub fn parse_quantity(input: &str) -> Result<u32> {
    let qty = input
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::validation("Invalid quantity."))?;
    if qty <= 0 {
        return Err(Error::validation("Quantity must be positive."));
    }
    if qty > i64::from(u32::MAX) {
        return Err(Error::validation("Invalid quantity."));
    }
    Ok(qty as u32)
}

pub fn is_done(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(DONE)
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}

impl<'s, S: Storage> Building<'s, S> {
    /// Loads the menu as it is right now; every reservation in this order is
    /// checked against that snapshot.
    pub fn start(store: &'s S, user_id: &str) -> Result<Self> {
        let loaded = MenuCatalog::load(store)?;
        let catalog = loaded.clone();
        debug!(
            "Order for {} started against {} menu items",
            user_id,
            loaded.items().len()
        );
        Ok(Building {
            store,
            user_id: user_id.to_string(),
            loaded,
            catalog,
            cart: Vec::new(),
            total: Decimal::ZERO,
        })
    }

    /// The menu including reservations made so far.
    pub fn catalog(&self) -> &MenuCatalog {
        &self.catalog
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.cart
    }

    /// Reserves stock and appends a line. On error the cart and stock are
    /// unchanged and the caller may carry on adding lines.
    pub fn add(&mut self, item_id: &str, quantity: u32) -> Result<&OrderLine> {
        let price = self.catalog.find(item_id)?.price;
        let total = price
            .checked_mul(Decimal::from(quantity))
            .and_then(|subtotal| self.total.checked_add(subtotal))
            .ok_or_else(|| {
                warn!("Rejected {} x {}: order total overflows", quantity, item_id);
                Error::validation(TOO_LARGE)
            })?;
        let reserved = self.catalog.reserve(item_id, quantity)?;
        self.cart.push(OrderLine::of(reserved, quantity));
        self.total = total;
        let line = &self.cart[self.cart.len() - 1];
        debug!("Cart line {}: {} x {}", self.cart.len(), line.quantity, line.item_id);
        Ok(line)
    }

    /// As [`Building::add`], with the quantity as typed.
    pub fn add_input(&mut self, item_id: &str, quantity: &str) -> Result<&OrderLine> {
        let item_id = item_id.trim();
        self.catalog.find(item_id)?;
        let quantity = parse_quantity(quantity)?;
        self.add(item_id, quantity)
    }

    pub fn finish(self) -> Finished<'s, S> {
        let Building {
            store,
            user_id,
            loaded,
            catalog,
            cart,
            total,
        } = self;
        if cart.is_empty() {
            debug!("Order for {} finished with an empty cart", user_id);
            return Finished::EmptyCart;
        }
        Finished::Review(Reviewing {
            store,
            user_id,
            loaded,
            catalog,
            cart,
            total,
        })
    }
}

impl<'s, S: Storage> Reviewing<'s, S> {
    pub fn lines(&self) -> &[OrderLine] {
        &self.cart
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// `yes` (any case) confirms; any other answer cancels.
    pub fn decide(self, answer: &str) -> Result<Outcome> {
        if is_yes(answer) {
            self.confirm().map(Outcome::Confirmed)
        } else {
            Ok(self.cancel())
        }
    }

    pub fn cancel(self) -> Outcome {
        debug!(
            "Order for {} cancelled; dropping {} line(s)",
            self.user_id,
            self.cart.len()
        );
        Outcome::Cancelled
    }

    pub fn confirm(self) -> Result<Order> {
        let now = Local::now().naive_local();
        self.confirm_at(now)
    }

    /// Writes the menu, then the ledger. If the ledger cannot be written the
    /// menu is put back as it was loaded, so stock is never taken for an order
    /// that was not recorded. Reservations are dropped with `self` on any
    /// error.
    pub fn confirm_at(self, now: NaiveDateTime) -> Result<Order> {
        let Reviewing {
            store,
            user_id,
            loaded,
            catalog,
            cart,
            ..
        } = self;

        let mut ledger = OrderLedger::load(store)?;
        let order = Order::new(
            ledger.next_order_id()?,
            &user_id,
            cart,
            now.format(TIMESTAMP_FORMAT).to_string(),
        )?;
        ledger.append(order.clone());

        catalog.save(store)?;
        if let Err(e) = ledger.save(store) {
            warn!(
                "Order {} could not be recorded; restoring menu stock",
                order.order_id
            );
            if let Err(restore) = loaded.save(store) {
                error!(
                    "Menu stock for failed order {} was not restored: {:?}",
                    order.order_id, restore
                );
            }
            return Err(e);
        }

        info!(
            "Confirmed order {} for {}: {} line(s), total {}",
            order.order_id,
            order.user_id,
            order.items.len(),
            order.total
        );
        Ok(order)
    }
}
