//! Guarded with `#[cfg(test)]` from `lib.rs`

use rust_decimal::Decimal;

use infra::persistence::{MemoryStore, Storage};

use crate::error::Error;
use crate::menu::{self, AddItem, Menu, UpdateItem};
use crate::orders::{Building, Finished, Order, OrderLedger, Outcome, Reviewing};
use crate::services::Commandable;


use self::junk_drawer::*;

fn review<'s>(cart: Building<'s, MemoryStore>) -> Reviewing<'s, MemoryStore> {
    match cart.finish() {
        Finished::Review(review) => review,
        Finished::EmptyCart => panic!("cart should not be empty"),
    }
}

fn persisted_orders(store: &MemoryStore) -> Vec<Order> {
    store.load::<Order>().expect("load orders")
}

#[test]
fn reserve_reject_confirm_scenario() {
    env_logger::try_init().unwrap_or_default();
    let store = store_with_menu(vec![item("A1", 50, 10)]);

    let mut cart = Building::start(&store, "rahim").expect("start");
    cart.add("A1", 3).expect("add 3");
    assert_eq!(cart.catalog().find("A1").expect("find").quantity, 7);

    let err = cart.add("A1", 20).expect_err("20 is too many");
    assert!(
        matches!(err, Error::InsufficientStock { available: 7, .. }),
        "{:?}",
        err
    );
    assert_eq!(cart.catalog().find("A1").expect("find").quantity, 7);
    assert_eq!(cart.lines().len(), 1);

    let order = review(cart).confirm_at(noon()).expect("confirm");

    assert_eq!(order.order_id, 1);
    assert_eq!(order.total, Decimal::from(150));
    assert_eq!(order.items[0].item_id, "A1");
    assert_eq!(order.items[0].quantity, 3);
    assert_eq!(order.items[0].price, Decimal::from(50));
    assert_eq!(order.timestamp, "2024-03-01 12:30:05");
    assert_eq!(stock_of(&store, "A1"), 7);
    assert_eq!(persisted_orders(&store), vec![order]);
}

#[test]
fn first_order_on_empty_ledger() {
    env_logger::try_init().unwrap_or_default();
    let store = store_with_menu(vec![item("T1", 25, 4)]);

    let mut cart = Building::start(&store, "karim").expect("start");
    cart.add_input("T1", "2").expect("add");
    let review = review(cart);
    assert_eq!(review.total(), Decimal::from(50));

    match review.decide("yes").expect("decide") {
        Outcome::Confirmed(order) => {
            assert_eq!(order.order_id, 1);
            assert_eq!(order.total, Decimal::from(50));
            assert_eq!(order.user_id, "karim");
        }
        other => panic!("Unexpected outcome: {:?}", other),
    }
}

#[test]
fn next_id_follows_out_of_order_ledger() {
    let store = store_with_menu(vec![item("A1", 10, 5)]);
    seed_orders(&store, &[1, 5, 3]);

    let mut cart = Building::start(&store, "rahim").expect("start");
    cart.add("A1", 1).expect("add");
    let order = review(cart).confirm_at(noon()).expect("confirm");

    assert_eq!(order.order_id, 6);
    let ids = persisted_orders(&store)
        .iter()
        .map(|o| o.order_id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![1, 5, 3, 6]);
}

#[test]
fn order_ids_are_allocated_at_confirmation() {
    let store = store_with_menu(vec![item("A1", 10, 5), item("B2", 20, 5)]);

    let mut first = Building::start(&store, "first").expect("start first");
    first.add("A1", 1).expect("add");
    let mut second = Building::start(&store, "second").expect("start second");
    second.add("B2", 1).expect("add");

    let b = review(second).confirm_at(noon()).expect("confirm second");
    let a = review(first).confirm_at(noon()).expect("confirm first");

    assert_eq!((b.order_id, a.order_id), (1, 2));
}

#[test]
fn empty_cart_persists_nothing() {
    let store = store_with_menu(vec![item("A1", 50, 1)]);
    let menu_before = store.raw("menu");

    let mut cart = Building::start(&store, "rahim").expect("start");
    assert!(cart.add("A1", 2).is_err());
    assert!(cart.add_input("nope", "1").is_err());
    assert!(cart.add_input("A1", "zero").is_err());

    assert!(matches!(cart.finish(), Finished::EmptyCart));
    assert_eq!(store.raw("menu"), menu_before);
    assert_eq!(store.raw("orders"), None);
}

#[test]
fn cancellation_leaves_storage_byte_identical() {
    let store = store_with_menu(vec![item("A1", 50, 10), item("B2", 5, 3)]);
    seed_orders(&store, &[1]);
    let menu_before = store.raw("menu");
    let orders_before = store.raw("orders");

    let mut cart = Building::start(&store, "rahim").expect("start");
    cart.add("A1", 4).expect("add");
    cart.add("B2", 3).expect("add");

    assert_eq!(review(cart).decide("no").expect("decide"), Outcome::Cancelled);
    assert_eq!(store.raw("menu"), menu_before);
    assert_eq!(store.raw("orders"), orders_before);
    assert_eq!(stock_of(&store, "A1"), 10);
}

#[test]
fn stock_never_drops_below_zero() {
    let initial = 17;
    let store = store_with_menu(vec![item("A1", 1, initial)]);
    let mut cart = Building::start(&store, "rahim").expect("start");

    let mut reserved = 0;
    for requested in [5, 9, 4, 1, 3, 1, 2, 1].iter().cloned() {
        let before = cart.catalog().find("A1").expect("find").quantity;
        match cart.add("A1", requested) {
            Ok(_) => reserved += requested,
            Err(Error::InsufficientStock { available, .. }) => {
                assert!(requested > before);
                assert_eq!(available, before);
            }
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
        let after = cart.catalog().find("A1").expect("find").quantity;
        assert_eq!(after, initial - reserved);
    }
    assert_eq!(reserved, initial);

    review(cart).confirm_at(noon()).expect("confirm");
    assert_eq!(stock_of(&store, "A1"), 0);
}

#[test]
fn total_is_exact_for_fractional_prices() {
    let store = MemoryStore::new();
    Menu::new(&store)
        .execute(AddItem {
            item_id: "C".into(),
            name: "Cha".into(),
            price: Decimal::new(10, 2),
            quantity: 100,
        })
        .expect("add item");
    Menu::new(&store)
        .execute(AddItem {
            item_id: "S".into(),
            name: "Singara".into(),
            price: Decimal::new(20, 2),
            quantity: 100,
        })
        .expect("add item");

    let mut cart = Building::start(&store, "rahim").expect("start");
    cart.add("C", 3).expect("add");
    cart.add("S", 7).expect("add");
    cart.add("C", 1).expect("add again");
    let order = review(cart).confirm_at(noon()).expect("confirm");

    let expected: Decimal = order
        .items
        .iter()
        .map(|l| l.subtotal().expect("subtotal"))
        .sum();
    assert_eq!(order.total, expected);
    assert_eq!(order.total, Decimal::new(180, 2));
    assert_eq!(persisted_orders(&store)[0].total, Decimal::new(180, 2));
}

#[test]
fn menu_edits_do_not_rewrite_history() {
    let store = store_with_menu(vec![item("A1", 50, 10)]);
    let mut cart = Building::start(&store, "rahim").expect("start");
    cart.add("A1", 1).expect("add");
    review(cart).confirm_at(noon()).expect("confirm");

    Menu::new(&store)
        .execute(UpdateItem {
            item_id: "A1".into(),
            name: Some("Renamed".into()),
            price: Some(Decimal::from(99)),
        })
        .expect("update");

    let orders = persisted_orders(&store);
    assert_eq!(orders[0].items[0].name, "Dish A1");
    assert_eq!(orders[0].items[0].price, Decimal::from(50));
}

#[test]
fn failed_menu_write_persists_nothing() {
    env_logger::try_init().unwrap_or_default();
    let store = store_with_menu(vec![item("A1", 50, 10)]);
    let menu_before = store.raw("menu");

    let mut cart = Building::start(&store, "rahim").expect("start");
    cart.add("A1", 2).expect("add");
    store.fail_writes_to("menu");

    let err = review(cart).confirm_at(noon()).expect_err("confirm");

    assert!(matches!(err, Error::Storage(_)), "{:?}", err);
    assert_eq!(store.raw("menu"), menu_before);
    assert_eq!(store.raw("orders"), None);
}

#[test]
fn failed_ledger_write_restores_menu_stock() {
    env_logger::try_init().unwrap_or_default();
    let store = store_with_menu(vec![item("A1", 50, 10)]);
    seed_orders(&store, &[1, 2]);
    let menu_before = store.raw("menu");
    let orders_before = store.raw("orders");

    let mut cart = Building::start(&store, "rahim").expect("start");
    cart.add("A1", 6).expect("add");
    store.fail_writes_to("orders");

    let err = review(cart).confirm_at(noon()).expect_err("confirm");

    assert!(matches!(err, Error::Storage(_)), "{:?}", err);
    assert_eq!(store.raw("menu"), menu_before);
    assert_eq!(store.raw("orders"), orders_before);
    assert_eq!(stock_of(&store, "A1"), 10);

    store.heal();
    let mut retry = Building::start(&store, "rahim").expect("restart");
    retry.add("A1", 6).expect("add");
    let order = review(retry).confirm_at(noon()).expect("confirm");
    assert_eq!(order.order_id, 3);
    assert_eq!(stock_of(&store, "A1"), 4);
    assert_eq!(OrderLedger::load(&store).expect("ledger").orders().len(), 3);
}

#[test]
fn malformed_menu_fails_before_building() {
    let store = MemoryStore::new();
    store.put_raw("menu", "{not json");

    let err = Building::start(&store, "rahim").expect_err("start");

    assert!(matches!(err, Error::Storage(_)), "{:?}", err);
}

#[test]
fn lines_that_would_overflow_the_total_are_rejected() {
    let store = MemoryStore::new();
    Menu::new(&store)
        .execute(AddItem {
            item_id: "X".into(),
            name: "Gold leaf".into(),
            price: menu::parse_price("79228162514264337593543950335").expect("price"),
            quantity: 5,
        })
        .expect("add item");

    let mut cart = Building::start(&store, "rahim").expect("start");
    let err = cart.add("X", 2).expect_err("subtotal overflows");
    assert!(matches!(err, Error::Validation(_)), "{:?}", err);
    assert!(cart.lines().is_empty());
    assert_eq!(cart.catalog().find("X").expect("find").quantity, 5);

    cart.add("X", 1).expect("one fits");
    let err = cart.add("X", 1).expect_err("total overflows");
    assert!(matches!(err, Error::Validation(_)), "{:?}", err);
    assert_eq!(cart.lines().len(), 1);
    assert_eq!(cart.catalog().find("X").expect("find").quantity, 4);

    let review = review(cart);
    assert_eq!(review.total(), Decimal::MAX);
    let order = review.confirm_at(noon()).expect("confirm");
    assert_eq!(order.total, Decimal::MAX);
}

#[test]
fn exhausted_order_ids_persist_nothing() {
    let store = store_with_menu(vec![item("A1", 50, 10)]);
    seed_orders(&store, &[u64::MAX]);
    let menu_before = store.raw("menu");
    let orders_before = store.raw("orders");

    let mut cart = Building::start(&store, "rahim").expect("start");
    cart.add("A1", 1).expect("add");
    let err = review(cart).confirm_at(noon()).expect_err("no ids left");

    assert!(matches!(err, Error::IdsExhausted { .. }), "{:?}", err);
    assert_eq!(store.raw("menu"), menu_before);
    assert_eq!(store.raw("orders"), orders_before);
}
