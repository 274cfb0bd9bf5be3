use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use log::*;

use infra::persistence::{JsonFiles, Storage};

pub mod config;
pub mod console;
pub mod error;
pub mod menu;
pub mod orders;
pub mod services;
pub mod session;
pub mod users;

#[cfg(test)]
mod test;

use crate::console::Console;
use crate::menu::{Menu, MenuItem};
use crate::orders::{Order, OrderLedger};
use crate::session::Session;
use crate::users::User;

/// The restaurant over its data directory.
#[derive(Debug, Clone)]
pub struct Rustaurant {
    store: JsonFiles,
    currency: String,
}

impl Rustaurant {
    pub fn new(config: &config::Config) -> Self {
        let store = config.store.build();
        let currency = config.currency.clone();
        Rustaurant { store, currency }
    }

    pub fn store(&self) -> &JsonFiles {
        &self.store
    }

    /// Creates any missing collection files.
    pub fn setup(&self) -> Result<()> {
        debug!("Init collections in {:?}", self.store.dir());
        let users = self.store.ensure::<User>().context("setup users")?;
        let items = self.store.ensure::<MenuItem>().context("setup menu")?;
        let orders = self.store.ensure::<Order>().context("setup orders")?;
        info!(
            "Data in {:?}: {} users, {} menu items, {} orders",
            self.store.dir(),
            users,
            items,
            orders
        );
        Ok(())
    }

    pub fn menu(&self) -> Menu<'_, JsonFiles> {
        Menu::new(&self.store)
    }

    pub fn ledger(&self) -> Result<OrderLedger> {
        Ok(OrderLedger::load(&self.store)?)
    }

    pub fn console<R: BufRead, W: Write>(&self, input: R, output: W) -> Console<R, W> {
        Console::new(input, output, &self.currency)
    }

    pub fn session<R: BufRead, W: Write>(&self, input: R, output: W) -> Session<'_, JsonFiles, R, W> {
        info!("Booting rustaurant");
        Session::new(&self.store, self.console(input, output))
    }
}
