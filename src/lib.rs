//! # Limit Order Book Matching Engine
//!
//! A single-symbol limit order book matching engine for crypto trading
//! pairs. Given a stream of incoming orders, the book maintains resting
//! liquidity, matches crossing orders under strict price-time priority,
//! emits the resulting trades to observers, and serves consistent
//! depth-of-book snapshots while mutations are in flight.
//!
//! ## Key Features
//!
//! - **Four order types**: limit (remainder rests), market (remainder
//!   discarded), immediate-or-cancel, and atomic fill-or-kill backed by a
//!   read-only liquidity pre-scan.
//! - **Strict price-time priority**: levels match best price first; within
//!   a level, strictly in arrival order. Trades always execute at the
//!   resting order's price.
//! - **Deterministic ordering**: order ids, arrival sequence numbers and
//!   trade ids are monotonic per book; the trade id sequence reflects
//!   global emission order.
//! - **Thread-safe by serialization**: each book owns a single mutex; a
//!   submission, cancellation or snapshot observes and produces a fully
//!   consistent state. Independent symbols never interact.
//! - **Non-blocking trade fan-out**: synchronous listeners and bounded
//!   drop-oldest queue taps; a slow or panicking observer can never stall
//!   the matcher.
//! - **Exact arithmetic**: prices are `u128` integer ticks, quantities
//!   `u64` integer lots. The message boundary converts decimals exactly
//!   once, with documented rounding.
//!
//! ## Quick Start
//!
//! ```
//! use matchbook_rs::{OrderBook, OrderKind, Side};
//!
//! let book = OrderBook::new("BTC-USD");
//!
//! // Rest an ask, then cross it.
//! book.submit(Side::Sell, OrderKind::Limit, 1000, 100).unwrap();
//! let trades = book.submit(Side::Buy, OrderKind::Limit, 1100, 40).unwrap();
//!
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].price, 1000); // the maker's price
//! assert_eq!(trades[0].quantity, 40);
//!
//! // The rest of the ask is still on the book.
//! let snapshot = book.snapshot(5);
//! assert_eq!(snapshot.asks[0].quantity, 60);
//! ```
//!
//! ## Observing Trades
//!
//! ```
//! use matchbook_rs::{OrderBook, Side};
//!
//! let book = OrderBook::new("BTC-USD");
//! let tap = book.subscribe_trades();
//!
//! book.submit_limit(Side::Sell, 1000, 10).unwrap();
//! book.submit_market(Side::Buy, 10).unwrap();
//!
//! let trades = tap.drain();
//! assert_eq!(trades.len(), 1);
//! assert_eq!(trades[0].maker_order_id, 1);
//! ```
//!
//! ## Scope
//!
//! The crate is the matching core plus its boundary contracts. The HTTP
//! submission surface and the streaming market-data/trade surfaces bind to
//! it through [`orderbook::messages`]; authentication, persistence, risk
//! checks and fee computation are collaborator concerns. Multi-symbol
//! deployments hold one [`OrderBook`] per symbol behind the
//! [`orderbook::manager`] registry.

pub mod orderbook;

pub mod prelude;
mod utils;

pub use orderbook::manager::{BookManager, BookManagerStd, BookManagerTokio};
pub use orderbook::messages::{
    DepthLevelMessage, DepthMessage, RawDecimal, SubmitCommand, SubmitRequest, SubmitResponse,
    TradeMessage, WireScale, units_to_decimal,
};
pub use orderbook::{
    BookConfig, DEPTH_SNAPSHOT_FORMAT_VERSION, DepthSnapshot, LevelDepth, Order, OrderBook,
    OrderBookError, OrderKind, PriceLevel, Side, SideBook, SnapshotPackage, SubscriptionId, Trade,
    TradeListener, TradeTap,
};
pub use utils::current_time_nanos;
