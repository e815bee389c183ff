use super::*;
use ati::{
    Action, ConnectionState, MarketPosition, OrderState, OrderType, OrderUpdate, TimeInForce,
};
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::thread;

fn params() -> OrderParams {
    OrderParams {
        account: "Sim101".into(),
        instrument: "ES 12-23".into(),
        action: Some(Action::Buy),
        quantity: 1,
        order_type: OrderType::Market,
        limit_price: None,
        stop_price: None,
        tif: TimeInForce::Day,
        oco_id: None,
        strategy: None,
        strategy_id: None,
    }
}

fn position(quantity: i64) -> Position {
    Position::new(
        PositionKey::new("ES 12-23", "Sim101"),
        MarketPosition::Long,
        quantity,
        dec!(4500.50),
    )
}

#[test]
fn test_position_replaced_wholesale() {
    let store = StateStore::new();
    let key = PositionKey::new("ES 12-23", "Sim101");
    assert_eq!(store.position(&key), None);

    store.apply(Update::Position(position(1)));
    store.apply(Update::Position(Position::new(
        key.clone(),
        MarketPosition::Flat,
        0,
        dec!(0),
    )));

    let stored = store.position(&key).unwrap();
    assert!(stored.is_flat());
    assert_eq!(stored.quantity(), 0);
    assert_eq!(store.positions().len(), 1);
}

#[test]
fn test_identical_update_is_idempotent() {
    let store = StateStore::new();
    store.apply(Update::Position(position(2)));
    let first = store.positions();
    store.apply(Update::Position(position(2)));
    assert_eq!(store.positions(), first);

    let id = OrderId::new("abc");
    let live = OrderUpdate::new(OrderState::Working, 0, None);
    store.apply(Update::Order(id.clone(), live.clone()));
    let first = store.order(&id);
    store.apply(Update::Order(id.clone(), live));
    assert_eq!(store.order(&id), first);
    assert_eq!(store.orders().len(), 1);
}

#[test]
fn test_order_update_merges_onto_placement() {
    let store = StateStore::new();
    let id = OrderId::new("abc");
    store.record_placement(id.clone(), params());

    store.apply(Update::Order(
        id.clone(),
        OrderUpdate::new(OrderState::Filled, 1, Some(dec!(4500.50))),
    ));

    let order = store.order(&id).unwrap();
    assert_eq!(order.params(), Some(&params()));
    assert_eq!(order.state(), Some(OrderState::Filled));
    assert_eq!(order.filled(), 1);
    assert_eq!(order.average_fill_price(), Some(dec!(4500.50)));
}

#[test]
fn test_unknown_order_is_materialized() {
    let store = StateStore::new();
    let id = OrderId::new("external");
    store.apply(Update::Order(
        id.clone(),
        OrderUpdate::new(OrderState::Accepted, 0, None),
    ));

    let order = store.order(&id).unwrap();
    assert!(order.params().is_none());
    assert_eq!(order.state(), Some(OrderState::Accepted));
}

#[test]
fn test_late_placement_keeps_live_fields() {
    let store = StateStore::new();
    let id = OrderId::new("abc");
    store.apply(Update::Order(
        id.clone(),
        OrderUpdate::new(OrderState::Working, 0, None),
    ));
    store.record_placement(id.clone(), params());

    let order = store.order(&id).unwrap();
    assert_eq!(order.params(), Some(&params()));
    assert_eq!(order.state(), Some(OrderState::Working));
}

#[test]
fn test_second_placement_does_not_overwrite_params() {
    let store = StateStore::new();
    let id = OrderId::new("abc");
    store.record_placement(id.clone(), params());

    let mut other = params();
    other.quantity = 5;
    store.record_placement(id.clone(), other);

    assert_eq!(store.order(&id).unwrap().params().unwrap().quantity, 1);
}

#[test]
fn test_get_by_target() {
    let store = StateStore::new();
    store.apply(Update::Connection(Connection::new(
        "Sim101",
        ConnectionState::Connected,
    )));

    assert_eq!(
        store.get(&UpdateTarget::Connection("Sim101".into())),
        Some(Record::Connection(Connection::new(
            "Sim101",
            ConnectionState::Connected
        )))
    );
    assert_eq!(store.get(&UpdateTarget::Order(OrderId::new("nope"))), None);
}

#[test]
fn test_readers_see_whole_records() {
    let store = Arc::new(StateStore::new());
    let key = PositionKey::new("ES 12-23", "Sim101");

    let writer = {
        let store = Arc::clone(&store);
        let key = key.clone();
        thread::spawn(move || {
            for i in 0..500 {
                let (side, qty) = if i % 2 == 0 {
                    (MarketPosition::Long, 1)
                } else {
                    (MarketPosition::Flat, 0)
                };
                store.apply(Update::Position(Position::new(
                    key.clone(),
                    side,
                    qty,
                    dec!(1),
                )));
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = Arc::clone(&store);
            let key = key.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    if let Some(p) = store.position(&key) {
                        // Quantity always belongs to the same write as the side.
                        assert_eq!(p.is_flat(), p.quantity() == 0);
                    }
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}
