use std::fmt;
use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use err_derive::Error;
use rust_decimal::Decimal;

use crate::menu::MenuItem;
use crate::orders::{Order, OrderLine};

const RULE_WIDTH: usize = 40;

/// The input side went away (end of file, closed terminal).
#[derive(Debug, Error)]
#[error(display = "input closed")]
pub struct Hangup;

/// Line-oriented prompts and listings over any reader/writer pair.
pub struct Console<R, W> {
    input: R,
    output: W,
    currency: String,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, currency: &str) -> Self {
        let currency = currency.to_string();
        Console {
            input,
            output,
            currency,
        }
    }

    /// Prints `label: ` and reads one trimmed line. Fails with [`Hangup`] at
    /// end of input.
    pub fn prompt(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;
        let mut line = String::new();
        let n = self.input.read_line(&mut line).context("read input")?;
        if n == 0 {
            writeln!(self.output)?;
            return Err(Hangup.into());
        }
        Ok(line.trim().to_string())
    }

    pub fn say(&mut self, args: fmt::Arguments) -> Result<()> {
        self.output.write_fmt(args)?;
        writeln!(self.output)?;
        Ok(())
    }

    pub fn header(&mut self, title: &str) -> Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.output, "\n{}", rule)?;
        writeln!(self.output, "{:^width$}", title, width = RULE_WIDTH)?;
        writeln!(self.output, "{}\n", rule)?;
        Ok(())
    }

    pub fn money(&self, amount: Decimal) -> String {
        format!("{:.2} {}", amount, self.currency)
    }

    pub fn show_menu(&mut self, items: &[MenuItem]) -> Result<()> {
        self.header("Menu Items")?;
        if items.is_empty() {
            return self.say(format_args!("Menu is empty.\n"));
        }
        for item in items {
            let price = self.money(item.price);
            self.say(format_args!(
                "ID: {} | {} - {} | Stock: {}",
                item.item_id, item.name, price, item.quantity
            ))?;
        }
        self.say(format_args!(""))
    }

    pub fn show_line(&mut self, line: &OrderLine, indent: &str) -> Result<()> {
        let subtotal = match line.subtotal() {
            Some(subtotal) => self.money(subtotal),
            None => "(too large)".to_string(),
        };
        self.say(format_args!(
            "{}{} x{} = {}",
            indent, line.name, line.quantity, subtotal
        ))
    }

    /// Lists orders with their lines; `with_user` adds the ordering user.
    pub fn show_orders<'o, I>(&mut self, title: &str, orders: I, with_user: bool) -> Result<()>
    where
        I: IntoIterator<Item = &'o Order>,
    {
        self.header(title)?;
        let mut any = false;
        for o in orders {
            any = true;
            let total = self.money(o.total);
            if with_user {
                self.say(format_args!(
                    "Order ID: {}, User: {}, Time: {}, Total: {}",
                    o.order_id, o.user_id, o.timestamp, total
                ))?;
            } else {
                self.say(format_args!(
                    "Order ID: {}, Time: {}, Total: {}",
                    o.order_id, o.timestamp, total
                ))?;
            }
            for line in o.items.iter() {
                self.show_line(line, "  - ")?;
            }
            self.say(format_args!(""))?;
        }
        if !any {
            self.say(format_args!("No orders found.\n"))?;
        }
        Ok(())
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
