use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use infra::documents::Entity;

use crate::error::Error;
use crate::menu::Reserved;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) const TOO_LARGE: &str = "Order total is too large.";

/// Name and price are copied from the menu when the line is added, so later
/// menu edits leave confirmed orders alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: u64,
    pub user_id: String,
    pub items: Vec<OrderLine>,
    pub total: Decimal,
    pub timestamp: String,
}

impl OrderLine {
    pub(crate) fn of(reserved: Reserved, quantity: u32) -> Self {
        let Reserved {
            item_id,
            name,
            price,
        } = reserved;
        OrderLine {
            item_id,
            name,
            price,
            quantity,
        }
    }

    /// `None` when price times quantity does not fit in a `Decimal`.
    pub fn subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

pub fn total_of(lines: &[OrderLine]) -> Option<Decimal> {
    lines.iter().try_fold(Decimal::ZERO, |total, line| {
        line.subtotal().and_then(|s| total.checked_add(s))
    })
}

impl Order {
    pub(crate) fn new(
        order_id: u64,
        user_id: &str,
        items: Vec<OrderLine>,
        timestamp: String,
    ) -> crate::error::Result<Self> {
        let total = total_of(&items).ok_or_else(|| Error::validation(TOO_LARGE))?;
        Ok(Order {
            order_id,
            user_id: user_id.to_string(),
            items,
            total,
            timestamp,
        })
    }
}

impl Entity for Order {
    const COLLECTION: &'static str = "orders";

    fn validate(&self) -> Result<(), String> {
        if self.items.is_empty() {
            return Err(format!("order {} has no items", self.order_id));
        }
        if let Some(line) = self.items.iter().find(|l| l.quantity == 0) {
            return Err(format!(
                "order {} has a zero quantity line for {:?}",
                self.order_id, line.item_id
            ));
        }
        let expected = match total_of(&self.items) {
            Some(total) => total,
            None => return Err(format!("order {} total overflows", self.order_id)),
        };
        if self.total != expected {
            return Err(format!(
                "order {} total {} does not match its lines ({})",
                self.order_id, self.total, expected
            ));
        }
        Ok(())
    }
}
