//! The interactive screens: account entry, the admin and customer menus and
//! the order loop.

use std::io::{BufRead, Write};

use anyhow::Result;
use log::*;

use infra::persistence::Storage;

use crate::console::{Console, Hangup};
use crate::error::Error;
use crate::menu::{self, AddItem, DeleteItem, Menu, SetStock, ShowMenu, UpdateItem};
use crate::orders::workflow::{self, Building, Finished, Outcome};
use crate::orders::OrderLedger;
use crate::services::{Commandable, Queryable};
use crate::users::{Accounts, CreateAccount, IsTaken, Login, Role, User};

pub struct Session<'a, S, R, W> {
    store: &'a S,
    console: Console<R, W>,
}

/// What the user is told for a failed step.
fn describe(err: &Error) -> String {
    match err {
        Error::Validation(msg) => msg.clone(),
        Error::NotFound { kind: "menu item", .. } => "Item ID not found.".to_string(),
        Error::NotFound { kind, .. } => format!("Unknown {}.", kind),
        Error::InsufficientStock { available, .. } => format!("Only {} in stock.", available),
        Error::DuplicateId { kind: "user", .. } => "User ID already exists! Try another.".to_string(),
        Error::DuplicateId { .. } => "Item ID already exists!".to_string(),
        Error::InvalidCredentials => "Invalid credentials!".to_string(),
        Error::IdsExhausted { kind, .. } => format!("No {} IDs left; nothing was saved.", kind),
        Error::Storage(e) => format!("Could not access saved data: {}", e),
    }
}

impl<'a, S: Storage, R: BufRead, W: Write> Session<'a, S, R, W> {
    pub fn new(store: &'a S, console: Console<R, W>) -> Self {
        Session { store, console }
    }

    /// Runs until the user exits or the input ends.
    pub fn run(&mut self) -> Result<()> {
        match self.main_menu() {
            Err(e) if e.is::<Hangup>() => {
                debug!("Input closed; ending session");
                Ok(())
            }
            other => other,
        }
    }

    pub fn into_console(self) -> Console<R, W> {
        self.console
    }

    /// Reports errors from the ordering components and carries on; anything
    /// else (console i/o, end of input) is passed up.
    fn recover(&mut self, res: Result<()>) -> Result<()> {
        match res {
            Ok(()) => Ok(()),
            Err(e) => match e.downcast::<Error>() {
                Ok(err) => {
                    if !err.is_retryable() {
                        error!("Operation failed: {:?}", err);
                    }
                    self.console.say(format_args!("{}\n", describe(&err)))
                }
                Err(other) => Err(other),
            },
        }
    }

    fn main_menu(&mut self) -> Result<()> {
        self.console.header("Welcome to Rustaurant")?;
        loop {
            self.console
                .say(format_args!("1. Create Account\n2. Login\n3. Exit"))?;
            let choice = self.console.prompt("Choose (1-3)")?;
            match choice.as_str() {
                "1" => {
                    let res = self.create_account();
                    self.recover(res)?;
                }
                "2" => {
                    let user = match self.login() {
                        Ok(user) => user,
                        Err(e) => {
                            self.recover(Err(e))?;
                            None
                        }
                    };
                    match user {
                        Some(ref user) if user.role == Role::Admin => self.admin_menu()?,
                        Some(ref user) => self.customer_menu(user)?,
                        None => {}
                    }
                }
                "3" => {
                    self.console.say(format_args!("Goodbye!"))?;
                    return Ok(());
                }
                _ => self.console.say(format_args!("Invalid option.\n"))?,
            }
        }
    }

    fn create_account(&mut self) -> Result<()> {
        let accounts = Accounts::new(self.store);
        self.console.header("Create New Account")?;
        let name = self.console.prompt("Full Name")?;
        let phone = self.console.prompt("Phone Number")?;
        let user_id = loop {
            let user_id = self.console.prompt("Choose User ID")?;
            if user_id.is_empty() {
                self.console.say(format_args!("User ID cannot be empty."))?;
            } else if accounts.query(IsTaken(user_id.clone()))? {
                self.console
                    .say(format_args!("User ID already exists! Try another."))?;
            } else {
                break user_id;
            }
        };
        let password = self.console.prompt("Password")?;
        let role = loop {
            let answer = self.console.prompt("Role (admin/customer)")?;
            if let Ok(role) = answer.parse::<Role>() {
                break role;
            }
        };
        let user = accounts.execute(CreateAccount {
            user_id,
            name,
            phone,
            password,
            role,
        })?;
        self.console.say(format_args!(
            "Account created successfully for {} as {}.\n",
            user.user_id, user.role
        ))
    }

    fn login(&mut self) -> Result<Option<User>> {
        self.console.header("Login")?;
        let user_id = self.console.prompt("User ID")?;
        let password = self.console.prompt("Password")?;
        match Accounts::new(self.store).query(Login { user_id, password }) {
            Ok(user) => {
                self.console.say(format_args!(
                    "Login successful! Welcome, {} ({})\n",
                    user.name, user.role
                ))?;
                Ok(Some(user))
            }
            Err(Error::InvalidCredentials) => {
                self.console.say(format_args!("Invalid credentials!\n"))?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn admin_menu(&mut self) -> Result<()> {
        loop {
            self.console.say(format_args!(
                "\nAdmin Menu:\n\
                 1. View Menu Items\n\
                 2. Add Menu Item\n\
                 3. Update Menu Item\n\
                 4. Delete Menu Item\n\
                 5. Update Stock Quantity\n\
                 6. View All Orders\n\
                 7. Logout\n"
            ))?;
            let choice = self.console.prompt("Choose (1-7)")?;
            let res = match choice.as_str() {
                "1" => self.view_menu(),
                "2" => self.add_menu_item(),
                "3" => self.update_menu_item(),
                "4" => self.delete_menu_item(),
                "5" => self.update_stock(),
                "6" => self.view_all_orders(),
                "7" => return self.console.say(format_args!("Logging out...\n")),
                _ => self.console.say(format_args!("Invalid choice.\n")),
            };
            self.recover(res)?;
        }
    }

    fn customer_menu(&mut self, user: &User) -> Result<()> {
        loop {
            self.console.say(format_args!(
                "\nCustomer Menu:\n\
                 1. View Menu\n\
                 2. Place Order\n\
                 3. View My Orders\n\
                 4. Logout\n"
            ))?;
            let choice = self.console.prompt("Choose (1-4)")?;
            let res = match choice.as_str() {
                "1" => self.view_menu(),
                "2" => self.place_order(user).map(|_| ()),
                "3" => self.view_my_orders(user),
                "4" => return self.console.say(format_args!("Logging out...\n")),
                _ => self.console.say(format_args!("Invalid choice.\n")),
            };
            self.recover(res)?;
        }
    }

    fn view_menu(&mut self) -> Result<()> {
        let items = Menu::new(self.store).query(ShowMenu)?;
        self.console.show_menu(&items)
    }

    fn add_menu_item(&mut self) -> Result<()> {
        let item_id = self.console.prompt("New Item ID")?;
        let name = self.console.prompt("Item Name")?;
        let price = menu::parse_price(&self.console.prompt("Price")?)?;
        let quantity = menu::parse_stock(&self.console.prompt("Initial Stock Quantity")?)?;
        Menu::new(self.store).execute(AddItem {
            item_id,
            name,
            price,
            quantity,
        })?;
        self.console.say(format_args!("Item added successfully.\n"))
    }

    fn update_menu_item(&mut self) -> Result<()> {
        let menu = Menu::new(self.store);
        let item_id = self.console.prompt("Item ID to update")?;
        let current = menu::MenuCatalog::new(menu.query(ShowMenu)?)
            .find(&item_id)?
            .clone();
        let name = self.console.prompt(&format!(
            "New Name (leave blank to keep '{}')",
            current.name
        ))?;
        let shown = self.console.money(current.price);
        let price = self
            .console
            .prompt(&format!("New Price (leave blank to keep {})", shown))?;
        let price = if price.is_empty() {
            None
        } else {
            Some(menu::parse_price(&price)?)
        };
        menu.execute(UpdateItem {
            item_id,
            name: Some(name),
            price,
        })?;
        self.console.say(format_args!("Item updated.\n"))
    }

    fn delete_menu_item(&mut self) -> Result<()> {
        let item_id = self.console.prompt("Item ID to delete")?;
        Menu::new(self.store).execute(DeleteItem { item_id })?;
        self.console.say(format_args!("Item deleted.\n"))
    }

    fn update_stock(&mut self) -> Result<()> {
        let menu = Menu::new(self.store);
        let item_id = self.console.prompt("Enter Item ID to update stock")?;
        let name = menu::MenuCatalog::new(menu.query(ShowMenu)?)
            .find(&item_id)?
            .name
            .clone();
        let quantity = menu::parse_stock(
            &self
                .console
                .prompt(&format!("Enter new stock quantity for {}", name))?,
        )?;
        menu.execute(SetStock { item_id, quantity })?;
        self.console.say(format_args!("Stock updated successfully.\n"))
    }

    fn view_all_orders(&mut self) -> Result<()> {
        let ledger = OrderLedger::load(self.store)?;
        self.console.show_orders("All Orders", ledger.orders(), true)
    }

    fn view_my_orders(&mut self, user: &User) -> Result<()> {
        let ledger = OrderLedger::load(self.store)?;
        self.console
            .show_orders("My Orders", ledger.for_user(&user.user_id), false)
    }

    /// Builds a cart line by line, shows the summary and asks for
    /// confirmation.
    pub fn place_order(&mut self, user: &User) -> Result<Outcome> {
        let mut cart = Building::start(self.store, &user.user_id)?;
        loop {
            let item_id = self.console.prompt("Enter Item ID (or 'done')")?;
            if workflow::is_done(&item_id) {
                break;
            }
            let name = match cart.catalog().find(&item_id) {
                Ok(item) => item.name.clone(),
                Err(_) => {
                    self.console.say(format_args!("Invalid Item ID.\n"))?;
                    continue;
                }
            };
            let quantity = self
                .console
                .prompt(&format!("Enter quantity for {}", name))?;
            match cart.add_input(&item_id, &quantity) {
                Ok(line) => {
                    let (quantity, name) = (line.quantity, line.name.clone());
                    self.console
                        .say(format_args!("Added {} x {}\n", quantity, name))?
                }
                Err(e) => {
                    debug!("Line for {:?} rejected: {}", item_id, e);
                    self.console.say(format_args!("{}\n", describe(&e)))?
                }
            }
        }

        let review = match cart.finish() {
            Finished::EmptyCart => {
                self.console.say(format_args!("No items selected.\n"))?;
                return Ok(Outcome::EmptyCart);
            }
            Finished::Review(review) => review,
        };

        self.console.header("Order Summary")?;
        for line in review.lines() {
            self.console.show_line(line, "")?;
        }
        let total = self.console.money(review.total());
        self.console.say(format_args!("Total: {}\n", total))?;

        let answer = self.console.prompt("Confirm order? (yes/no)")?;
        let outcome = review.decide(&answer)?;
        match outcome {
            Outcome::Confirmed(ref order) => self.console.say(format_args!(
                "Order placed successfully. Order ID: {}\n",
                order.order_id
            ))?,
            Outcome::Cancelled => self.console.say(format_args!("Order cancelled.\n"))?,
            Outcome::EmptyCart => {}
        }
        Ok(outcome)
    }
}
