//! Multi-book registry and centralized trade routing.

use matchbook_rs::{BookManager, BookManagerStd, BookManagerTokio, OrderBookError, Side};
use std::sync::Arc;

#[test]
fn test_add_and_lookup_books() {
    let manager = BookManagerStd::new();
    let btc = manager.add_book("BTC-USD").unwrap();
    let eth = manager.add_book("ETH-USD").unwrap();

    assert_eq!(manager.book_count(), 2);
    assert!(manager.has_book("BTC-USD"));
    assert!(!manager.has_book("DOGE-USD"));
    assert!(manager.book("DOGE-USD").is_none());

    let mut symbols = manager.symbols();
    symbols.sort();
    assert_eq!(symbols, vec!["BTC-USD", "ETH-USD"]);

    assert_eq!(btc.symbol(), "BTC-USD");
    assert_eq!(eth.symbol(), "ETH-USD");
}

#[test]
fn test_add_book_is_idempotent() {
    let manager = BookManagerStd::new();
    let first = manager.add_book("BTC-USD").unwrap();
    first.submit_limit(Side::Buy, 100, 10).unwrap();

    let second = manager.add_book("BTC-USD").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(manager.book_count(), 1);
    assert_eq!(second.order_count(), 1);
}

#[test]
fn test_empty_symbol_rejected() {
    let manager = BookManagerStd::new();
    assert!(matches!(
        manager.add_book(""),
        Err(OrderBookError::InvalidSymbol { .. })
    ));
    assert!(matches!(
        manager.add_book("   "),
        Err(OrderBookError::InvalidSymbol { .. })
    ));
    assert_eq!(manager.book_count(), 0);
}

#[test]
fn test_remove_book() {
    let manager = BookManagerStd::new();
    manager.add_book("BTC-USD").unwrap();

    let removed = manager.remove_book("BTC-USD");
    assert!(removed.is_some());
    assert!(manager.remove_book("BTC-USD").is_none());
    assert_eq!(manager.book_count(), 0);
}

#[test]
fn test_books_are_independent() {
    let manager = BookManagerStd::new();
    let btc = manager.add_book("BTC-USD").unwrap();
    let eth = manager.add_book("ETH-USD").unwrap();

    btc.submit_limit(Side::Sell, 100, 10).unwrap();
    eth.submit_limit(Side::Buy, 100, 10).unwrap();

    // A crossing order on one symbol never touches the other.
    let trades = btc.submit_market(Side::Buy, 5).unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].symbol, "BTC-USD");
    assert_eq!(eth.best_bid(), Some(100));
    assert_eq!(eth.order_count(), 1);
}

#[test]
fn test_std_trade_processor_drains_routed_trades() {
    let manager = BookManagerStd::new();
    let book = manager.add_book("BTC-USD").unwrap();
    let handle = manager.start_trade_processor();

    book.submit_limit(Side::Sell, 100, 10).unwrap();
    book.submit_market(Side::Buy, 10).unwrap();

    // Dropping the manager (and with it the sender) ends the processor.
    drop(manager);
    drop(book);
    handle.join().unwrap();
}

#[test]
#[should_panic(expected = "trade processor already started")]
fn test_std_trade_processor_cannot_start_twice() {
    let manager = BookManagerStd::new();
    let _first = manager.start_trade_processor();
    let _second = manager.start_trade_processor();
}

#[tokio::test]
async fn test_tokio_manager_routes_trades() {
    let manager = BookManagerTokio::new();
    let book = manager.add_book("BTC-USD").unwrap();
    let handle = manager.start_trade_processor();

    let trades = tokio::task::spawn_blocking(move || {
        book.submit_limit(Side::Sell, 100, 10).unwrap();
        book.submit_market(Side::Buy, 4).unwrap()
    })
    .await
    .unwrap();
    assert_eq!(trades.len(), 1);

    drop(manager);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_tokio_manager_registry() {
    let manager = BookManagerTokio::new();
    manager.add_book("BTC-USD").unwrap();
    manager.add_book("ETH-USD").unwrap();

    assert_eq!(manager.book_count(), 2);
    assert!(manager.has_book("ETH-USD"));
    assert!(manager.remove_book("ETH-USD").is_some());
    assert_eq!(manager.book_count(), 1);
}
