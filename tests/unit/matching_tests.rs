//! Matching semantics: crossing, price-time priority and the per-kind
//! residual policies.

use matchbook_rs::{OrderBook, OrderKind, Side};

// --- Resting then crossing limit ---

#[test]
fn test_resting_then_crossing_limit() {
    let book = OrderBook::new("BTC-USD");

    let trades = book.submit_limit(Side::Sell, 10, 100).unwrap();
    assert!(trades.is_empty());
    assert_eq!(book.best_ask(), Some(10));
    assert_eq!(book.best_bid(), None);

    let trades = book.submit_limit(Side::Buy, 11, 40).unwrap();
    assert_eq!(trades.len(), 1);
    let trade = &trades[0];
    assert_eq!(trade.price, 10); // maker's price, not the taker's 11
    assert_eq!(trade.quantity, 40);
    assert_eq!(trade.maker_order_id, 1);
    assert_eq!(trade.taker_order_id, 2);
    assert_eq!(trade.aggressor_side, Side::Buy);

    let asks = book.orders_at(Side::Sell, 10);
    assert_eq!(asks.len(), 1);
    assert_eq!(asks[0].remaining, 60);
    assert_eq!(book.best_bid(), None); // taker fully filled, nothing rests
}

// --- Market orders ---

#[test]
fn test_market_sweeps_multiple_levels() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Sell, 10, 5).unwrap(); // id 1
    book.submit_limit(Side::Sell, 11, 5).unwrap(); // id 2

    let trades = book.submit_market(Side::Buy, 8).unwrap(); // id 3
    assert_eq!(trades.len(), 2);

    assert_eq!(trades[0].price, 10);
    assert_eq!(trades[0].quantity, 5);
    assert_eq!(trades[0].maker_order_id, 1);
    assert_eq!(trades[0].taker_order_id, 3);
    assert_eq!(trades[0].aggressor_side, Side::Buy);

    assert_eq!(trades[1].price, 11);
    assert_eq!(trades[1].quantity, 3);
    assert_eq!(trades[1].maker_order_id, 2);

    assert_eq!(book.best_ask(), Some(11));
    assert_eq!(book.orders_at(Side::Sell, 11)[0].remaining, 2);
}

#[test]
fn test_market_on_empty_book_discards_everything() {
    let book = OrderBook::new("BTC-USD");
    let trades = book.submit_market(Side::Buy, 50).unwrap();
    assert!(trades.is_empty());
    assert_eq!(book.order_count(), 0);
    assert_eq!(book.best_bid(), None);
}

#[test]
fn test_market_residual_never_rests() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Buy, 10, 3).unwrap();

    let trades = book.submit_market(Side::Sell, 10).unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].quantity, 3);
    // Bid side consumed, sell residual discarded.
    assert_eq!(book.best_bid(), None);
    assert_eq!(book.best_ask(), None);
    assert_eq!(book.order_count(), 0);
}

// --- Time priority ---

#[test]
fn test_time_priority_within_level() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Buy, 10, 3).unwrap(); // id 1, first in
    book.submit_limit(Side::Buy, 10, 3).unwrap(); // id 2, second in

    let trades = book.submit_limit(Side::Sell, 10, 4).unwrap(); // id 3
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].maker_order_id, 1);
    assert_eq!(trades[0].quantity, 3);
    assert_eq!(trades[1].maker_order_id, 2);
    assert_eq!(trades[1].quantity, 1);

    let bids = book.orders_at(Side::Buy, 10);
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0].id, 2); // the remainder belongs to the second order
    assert_eq!(bids[0].remaining, 2);
}

// --- Price priority ---

#[test]
fn test_price_priority_across_levels() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Sell, 12, 5).unwrap(); // id 1, worse
    book.submit_limit(Side::Sell, 10, 5).unwrap(); // id 2, best
    book.submit_limit(Side::Sell, 11, 5).unwrap(); // id 3, middle

    let trades = book.submit_limit(Side::Buy, 12, 12).unwrap();
    let prices: Vec<u128> = trades.iter().map(|t| t.price).collect();
    assert_eq!(prices, vec![10, 11, 12]);
    let makers: Vec<u64> = trades.iter().map(|t| t.maker_order_id).collect();
    assert_eq!(makers, vec![2, 3, 1]);

    assert_eq!(book.orders_at(Side::Sell, 12)[0].remaining, 3);
}

#[test]
fn test_limit_stops_at_its_price_and_rests() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Sell, 10, 5).unwrap();
    book.submit_limit(Side::Sell, 12, 5).unwrap();

    // Crosses level 10 but not level 12; remainder rests at 11.
    let trades = book.submit_limit(Side::Buy, 11, 8).unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].price, 10);
    assert_eq!(trades[0].quantity, 5);

    assert_eq!(book.best_bid(), Some(11));
    assert_eq!(book.orders_at(Side::Buy, 11)[0].remaining, 3);
    assert_eq!(book.best_ask(), Some(12));
}

#[test]
fn test_sell_taker_walks_bids_downward() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Buy, 9, 4).unwrap(); // id 1
    book.submit_limit(Side::Buy, 11, 4).unwrap(); // id 2, best bid
    book.submit_limit(Side::Buy, 10, 4).unwrap(); // id 3

    let trades = book.submit_limit(Side::Sell, 10, 10).unwrap();
    let fills: Vec<(u128, u64)> = trades.iter().map(|t| (t.price, t.maker_order_id)).collect();
    assert_eq!(fills, vec![(11, 2), (10, 3)]);
    // Level 9 does not cross a sell at 10; residual rests as an ask.
    assert_eq!(book.best_ask(), Some(10));
    assert_eq!(book.orders_at(Side::Sell, 10)[0].remaining, 2);
    assert_eq!(book.best_bid(), Some(9));
}

// --- IOC ---

#[test]
fn test_ioc_discards_residual() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Sell, 10, 3).unwrap();

    let trades = book.submit_ioc(Side::Buy, 10, 5).unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].price, 10);
    assert_eq!(trades[0].quantity, 3);

    assert_eq!(book.best_bid(), None); // residual 2 discarded
    assert_eq!(book.best_ask(), None);
}

#[test]
fn test_ioc_respects_limit_price() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Sell, 12, 5).unwrap();

    let trades = book.submit_ioc(Side::Buy, 10, 5).unwrap();
    assert!(trades.is_empty());
    assert_eq!(book.best_ask(), Some(12)); // untouched
    assert_eq!(book.best_bid(), None);
}

// --- FOK ---

#[test]
fn test_fok_insufficient_liquidity_executes_nothing() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Sell, 10, 3).unwrap();

    let trades = book.submit_fok(Side::Buy, 10, 5).unwrap();
    assert!(trades.is_empty());

    // Book unchanged.
    assert_eq!(book.best_ask(), Some(10));
    assert_eq!(book.orders_at(Side::Sell, 10)[0].remaining, 3);
    assert_eq!(book.order_count(), 1);
}

#[test]
fn test_fok_sufficient_across_levels() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Sell, 10, 3).unwrap(); // id 1
    book.submit_limit(Side::Sell, 11, 4).unwrap(); // id 2

    let trades = book.submit_fok(Side::Buy, 11, 6).unwrap();
    assert_eq!(trades.len(), 2);
    assert_eq!((trades[0].price, trades[0].quantity), (10, 3));
    assert_eq!((trades[1].price, trades[1].quantity), (11, 3));

    assert_eq!(book.orders_at(Side::Sell, 11)[0].remaining, 1);
}

#[test]
fn test_fok_ignores_liquidity_beyond_its_price() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Sell, 10, 3).unwrap();
    book.submit_limit(Side::Sell, 20, 100).unwrap(); // not crossable at 11

    let trades = book.submit_fok(Side::Buy, 11, 5).unwrap();
    assert!(trades.is_empty());
    assert_eq!(book.orders_at(Side::Sell, 10)[0].remaining, 3);
}

#[test]
fn test_fok_exact_fill() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Sell, 10, 5).unwrap();

    let trades = book.submit_fok(Side::Buy, 10, 5).unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].quantity, 5);
    assert_eq!(book.order_count(), 0);
}

// --- Trade id ordering ---

#[test]
fn test_trade_ids_monotonic_across_submits() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Sell, 10, 5).unwrap();
    book.submit_limit(Side::Sell, 11, 5).unwrap();

    let mut all_trades = Vec::new();
    all_trades.extend(book.submit_limit(Side::Buy, 10, 2).unwrap());
    all_trades.extend(book.submit_limit(Side::Buy, 11, 6).unwrap());
    all_trades.extend(book.submit_market(Side::Buy, 1).unwrap());

    assert_eq!(all_trades.len(), 4);
    for pair in all_trades.windows(2) {
        assert!(pair[1].trade_id > pair[0].trade_id);
    }
}

// --- Conservation ---

#[test]
fn test_quantity_conservation_on_partial_fill() {
    let book = OrderBook::new("BTC-USD");
    book.submit_limit(Side::Sell, 10, 7).unwrap();

    let quantity = 20;
    let trades = book.submit(Side::Buy, OrderKind::Limit, 10, quantity).unwrap();
    let executed: u64 = trades.iter().map(|t| t.quantity).sum();
    let resting: u64 = book
        .orders_at(Side::Buy, 10)
        .iter()
        .map(|o| o.remaining)
        .sum();
    assert_eq!(executed + resting, quantity);
}
