//! The menu collection: a catalog view used while ordering, and the
//! administrative commands that maintain it.

use std::str::FromStr;

use log::*;
use rust_decimal::Decimal;

use infra::persistence::Storage;

use crate::error::{Error, Result};
use crate::services::{Commandable, Queryable, Request};

mod models;

pub use self::models::{MenuItem, Reserved};

const KIND: &str = "menu item";

/// A snapshot of the menu, loaded once and mutated in memory. Nothing is
/// visible to other readers until [`MenuCatalog::save`] is called.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MenuCatalog {
    items: Vec<MenuItem>,
}

impl MenuCatalog {
    pub fn new(items: Vec<MenuItem>) -> Self {
        MenuCatalog { items }
    }

    pub fn load<S: Storage>(store: &S) -> Result<Self> {
        let items = store.load::<MenuItem>()?;
        Ok(MenuCatalog { items })
    }

    pub fn save<S: Storage>(&self, store: &S) -> Result<()> {
        store.save(&self.items)?;
        Ok(())
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn find(&self, item_id: &str) -> Result<&MenuItem> {
        self.items
            .iter()
            .find(|i| i.item_id == item_id)
            .ok_or_else(|| not_found(item_id))
    }

    fn find_mut(&mut self, item_id: &str) -> Result<&mut MenuItem> {
        self.items
            .iter_mut()
            .find(|i| i.item_id == item_id)
            .ok_or_else(|| not_found(item_id))
    }

    /// Takes `quantity` out of the in-memory stock of `item_id`. On failure the
    /// stock is left as it was.
    pub fn reserve(&mut self, item_id: &str, quantity: u32) -> Result<Reserved> {
        if quantity == 0 {
            return Err(Error::validation("Quantity must be positive."));
        }
        let item = self.find_mut(item_id)?;
        if quantity > item.quantity {
            warn!(
                "Rejected reservation of {} x {}; {} available",
                quantity, item_id, item.quantity
            );
            return Err(Error::InsufficientStock {
                item_id: item_id.to_string(),
                requested: quantity,
                available: item.quantity,
            });
        }
        item.quantity -= quantity;
        debug!("Reserved {} x {}; {} left", quantity, item_id, item.quantity);
        Ok(item.snapshot())
    }
}

fn not_found(item_id: &str) -> Error {
    Error::NotFound {
        kind: KIND,
        id: item_id.to_string(),
    }
}

pub fn parse_price(input: &str) -> Result<Decimal> {
    let price = Decimal::from_str(input.trim())
        .map_err(|_| Error::validation(format!("Invalid price: {:?}", input.trim())))?;
    check_price(price)?;
    Ok(price)
}

/// Prices are whole cents at most, so listed subtotals add up to the total.
fn check_price(price: Decimal) -> Result<()> {
    if price < Decimal::ZERO {
        return Err(Error::validation("Price cannot be negative."));
    }
    if price.normalize().scale() > 2 {
        return Err(Error::validation("Price cannot have more than 2 decimal places."));
    }
    Ok(())
}

pub fn parse_stock(input: &str) -> Result<u32> {
    input
        .trim()
        .parse::<u32>()
        .map_err(|_| Error::validation(format!("Invalid quantity: {:?}", input.trim())))
}

#[derive(Debug)]
pub struct Menu<'a, S> {
    store: &'a S,
}

#[derive(Debug, Clone)]
pub struct ShowMenu;

#[derive(Debug, Clone)]
pub struct AddItem {
    pub item_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct UpdateItem {
    pub item_id: String,
    pub name: Option<String>,
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct DeleteItem {
    pub item_id: String,
}

#[derive(Debug, Clone)]
pub struct SetStock {
    pub item_id: String,
    pub quantity: u32,
}

impl Request for ShowMenu {
    type Resp = Vec<MenuItem>;
}
impl Request for AddItem {
    type Resp = ();
}
impl Request for UpdateItem {
    type Resp = MenuItem;
}
impl Request for DeleteItem {
    type Resp = MenuItem;
}
impl Request for SetStock {
    type Resp = MenuItem;
}

impl<'a, S: Storage> Menu<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Menu { store }
    }

    fn modify<R, F: FnOnce(&mut MenuCatalog) -> Result<R>>(&self, f: F) -> Result<R> {
        let mut catalog = MenuCatalog::load(self.store)?;
        let res = f(&mut catalog)?;
        catalog.save(self.store)?;
        Ok(res)
    }
}

impl<'a, S: Storage> Queryable<ShowMenu> for Menu<'a, S> {
    fn query(&self, _: ShowMenu) -> Result<Vec<MenuItem>> {
        let catalog = MenuCatalog::load(self.store)?;
        Ok(catalog.items)
    }
}

impl<'a, S: Storage> Commandable<AddItem> for Menu<'a, S> {
    fn execute(&self, req: AddItem) -> Result<()> {
        let AddItem {
            item_id,
            name,
            price,
            quantity,
        } = req;
        let item_id = item_id.trim().to_string();
        if item_id.is_empty() {
            return Err(Error::validation("Item ID cannot be empty."));
        }
        check_price(price)?;
        self.modify(|catalog| {
            if catalog.find(&item_id).is_ok() {
                return Err(Error::DuplicateId { kind: KIND, id: item_id });
            }
            info!("Adding {} ({}) at {}", item_id, name, price);
            catalog
                .items
                .push(MenuItem::new(&item_id, name.trim(), price, quantity));
            Ok(())
        })
    }
}

impl<'a, S: Storage> Commandable<UpdateItem> for Menu<'a, S> {
    fn execute(&self, req: UpdateItem) -> Result<MenuItem> {
        if let Some(price) = req.price {
            check_price(price)?;
        }
        self.modify(|catalog| {
            let item = catalog.find_mut(&req.item_id)?;
            if let Some(name) = req.name.filter(|n| !n.trim().is_empty()) {
                item.name = name.trim().to_string();
            }
            if let Some(price) = req.price {
                item.price = price;
            }
            debug!("Updated {:?}", item);
            Ok(item.clone())
        })
    }
}

impl<'a, S: Storage> Commandable<DeleteItem> for Menu<'a, S> {
    fn execute(&self, req: DeleteItem) -> Result<MenuItem> {
        self.modify(|catalog| {
            let pos = catalog
                .items
                .iter()
                .position(|i| i.item_id == req.item_id)
                .ok_or_else(|| not_found(&req.item_id))?;
            let removed = catalog.items.remove(pos);
            info!("Deleted {:?}", removed);
            Ok(removed)
        })
    }
}

impl<'a, S: Storage> Commandable<SetStock> for Menu<'a, S> {
    fn execute(&self, req: SetStock) -> Result<MenuItem> {
        self.modify(|catalog| {
            let item = catalog.find_mut(&req.item_id)?;
            item.quantity = req.quantity;
            info!("Stock of {} set to {}", item.item_id, item.quantity);
            Ok(item.clone())
        })
    }
}
