use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use infra::documents::Entity;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub item_id: String,
    pub name: String,
    pub price: Decimal,
    /// Stock on hand.
    pub quantity: u32,
}

/// What an order line keeps of a menu item once it has been reserved.
#[derive(Debug, Clone, PartialEq)]
pub struct Reserved {
    pub item_id: String,
    pub name: String,
    pub price: Decimal,
}

impl MenuItem {
    pub fn new(item_id: &str, name: &str, price: Decimal, quantity: u32) -> Self {
        let item_id = item_id.to_string();
        let name = name.to_string();
        MenuItem {
            item_id,
            name,
            price,
            quantity,
        }
    }

    pub(crate) fn snapshot(&self) -> Reserved {
        Reserved {
            item_id: self.item_id.clone(),
            name: self.name.clone(),
            price: self.price,
        }
    }
}

impl Entity for MenuItem {
    const COLLECTION: &'static str = "menu";

    fn validate(&self) -> Result<(), String> {
        if self.item_id.is_empty() {
            return Err("empty item_id".to_string());
        }
        if self.price < Decimal::ZERO {
            return Err(format!("negative price {} for {:?}", self.price, self.item_id));
        }
        Ok(())
    }
}
