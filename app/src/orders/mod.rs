//! Confirmed orders and the workflow that creates them.

pub mod ledger;
mod models;
pub mod workflow;

pub use self::ledger::{next_order_id, OrderLedger};
pub use self::models::{total_of, Order, OrderLine, TIMESTAMP_FORMAT};
pub use self::workflow::{Building, Finished, Outcome, Reviewing};
