//! Depth snapshot construction, clamping and the checksummed package.

use matchbook_rs::{BookConfig, DepthMessage, OrderBook, Side, SnapshotPackage, WireScale};

fn populated_book() -> OrderBook {
    let book = OrderBook::new("BTC-USD");
    for (price, quantity) in [(95u128, 10u64), (94, 20), (93, 30)] {
        book.submit_limit(Side::Buy, price, quantity).unwrap();
    }
    for (price, quantity) in [(105u128, 5u64), (106, 15), (107, 25)] {
        book.submit_limit(Side::Sell, price, quantity).unwrap();
    }
    book
}

#[test]
fn test_snapshot_orders_levels_best_first() {
    let book = populated_book();
    let snapshot = book.snapshot(10);

    let bid_prices: Vec<u128> = snapshot.bids.iter().map(|l| l.price).collect();
    assert_eq!(bid_prices, vec![95, 94, 93]); // descending
    let ask_prices: Vec<u128> = snapshot.asks.iter().map(|l| l.price).collect();
    assert_eq!(ask_prices, vec![105, 106, 107]); // ascending

    assert_eq!(snapshot.bids[0].quantity, 10);
    assert_eq!(snapshot.asks[2].quantity, 25);
    assert_eq!(snapshot.symbol, "BTC-USD");
    assert!(snapshot.timestamp_ns > 0);
}

#[test]
fn test_snapshot_truncates_to_requested_depth() {
    let book = populated_book();
    let snapshot = book.snapshot(2);
    assert_eq!(snapshot.bids.len(), 2);
    assert_eq!(snapshot.asks.len(), 2);
    assert_eq!(snapshot.bids[1].price, 94);
}

#[test]
fn test_snapshot_shallow_book_returns_as_is() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Buy, 95, 10).unwrap();

    let snapshot = book.snapshot(10);
    assert_eq!(snapshot.bids.len(), 1); // no padding
    assert!(snapshot.asks.is_empty());
}

#[test]
fn test_snapshot_depth_clamped_to_max_depth() {
    let book = OrderBook::with_config(
        "BTC-USD",
        BookConfig {
            max_depth: 2,
            ..BookConfig::default()
        },
    );
    for price in [105u128, 106, 107, 108] {
        book.submit_limit(Side::Sell, price, 5).unwrap();
    }

    let snapshot = book.snapshot(100);
    assert_eq!(snapshot.asks.len(), 2);
}

#[test]
fn test_snapshot_aggregates_orders_at_same_price() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Buy, 95, 10).unwrap();
    book.submit_limit(Side::Buy, 95, 15).unwrap();

    let snapshot = book.snapshot(5);
    assert_eq!(snapshot.bids.len(), 1);
    assert_eq!(snapshot.bids[0].quantity, 25);
}

#[test]
fn test_snapshot_reflects_fills_and_cancels() {
    let book = populated_book();
    book.submit_market(Side::Buy, 8).unwrap(); // eats 5 at 105, 3 at 106
    assert!(book.cancel(3)); // id 3 = bid 30 at 93

    let snapshot = book.snapshot(10);
    let ask_top = snapshot.asks.first().unwrap();
    assert_eq!((ask_top.price, ask_top.quantity), (106, 12));
    assert!(!snapshot.bids.iter().any(|l| l.price == 93));
}

#[test]
fn test_snapshot_helpers_match_book() {
    let book = populated_book();
    let snapshot = book.snapshot(10);
    assert_eq!(snapshot.best_bid().unwrap().price, 95);
    assert_eq!(snapshot.best_ask().unwrap().price, 105);
    assert_eq!(snapshot.spread(), book.spread());
    assert_eq!(snapshot.mid_price(), book.mid_price());
    assert_eq!(snapshot.total_bid_quantity(), 60);
    assert_eq!(snapshot.total_ask_quantity(), 45);
}

#[test]
fn test_snapshot_package_round_trip_from_book() {
    let book = populated_book();
    let package = SnapshotPackage::new(book.snapshot(10)).unwrap();
    let json = package.to_json().unwrap();

    let restored = SnapshotPackage::from_json(&json).unwrap();
    assert!(restored.validate().is_ok());
    let snapshot = restored.into_snapshot().unwrap();
    assert_eq!(snapshot.bids.len(), 3);
}

#[test]
fn test_depth_message_ordering() {
    let book = populated_book();
    let message = DepthMessage::from_snapshot(&book.snapshot(10), WireScale::default());
    assert_eq!(message.bids[0].price, "0.95");
    assert_eq!(message.asks[0].price, "1.05");
    assert_eq!(message.bids.len(), 3);
}
