//! Core order book: configuration, validation, the submission entry points
//! and the per-symbol concurrency envelope.

use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{error, trace};

use super::error::OrderBookError;
use super::side_book::SideBook;
use super::snapshot::{DepthSnapshot, LevelDepth};
use super::trade::{SubscriptionId, Trade, TradeListener, TradePublisher, TradeTap};
use super::types::{Order, OrderKind, Side};
use crate::utils::current_time_nanos;

/// Static configuration of one order book.
#[derive(Debug, Clone, Copy)]
pub struct BookConfig {
    /// Minimum price increment in integer ticks. Order prices must be
    /// positive multiples of this value. Must be > 0.
    pub tick_size: u128,
    /// Minimum quantity increment in integer lots. Order quantities must be
    /// positive multiples of this value. Must be > 0.
    pub lot_size: u64,
    /// Maximum depth accepted by [`OrderBook::snapshot`]; larger requests
    /// are clamped.
    pub max_depth: usize,
    /// Capacity of each bounded trade queue created by
    /// [`OrderBook::subscribe_trades`].
    pub trade_queue_bound: usize,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            tick_size: 1,
            lot_size: 1,
            max_depth: 50,
            trade_queue_bound: 4096,
        }
    }
}

/// All mutable book state, guarded by the book's mutex.
pub(super) struct BookState {
    pub(super) bids: SideBook,
    pub(super) asks: SideBook,
    /// Location of every resting order, for O(log n) cancellation.
    pub(super) order_index: HashMap<u64, (u128, Side)>,
    pub(super) next_order_id: u64,
    pub(super) next_trade_id: u64,
    pub(super) next_arrival_seq: u64,
    pub(super) last_trade_price: Option<u128>,
    pub(super) publisher: TradePublisher,
}

impl BookState {
    fn new() -> Self {
        Self {
            bids: SideBook::new(Side::Buy),
            asks: SideBook::new(Side::Sell),
            order_index: HashMap::new(),
            next_order_id: 1,
            next_trade_id: 1,
            next_arrival_seq: 1,
            last_trade_price: None,
            publisher: TradePublisher::new(),
        }
    }

    /// Stamp an incoming order with its identity and arrival position.
    fn admit(&mut self, side: Side, kind: OrderKind, price: u128, quantity: u64) -> Order {
        let id = self.next_order_id;
        self.next_order_id += 1;
        let arrival_seq = self.next_arrival_seq;
        self.next_arrival_seq += 1;

        Order {
            id,
            side,
            kind,
            price: if kind.has_price() { price } else { 0 },
            quantity,
            remaining: quantity,
            arrival_seq,
            timestamp_ns: current_time_nanos(),
        }
    }

    fn publish_trades(&mut self, trades: &[Trade]) {
        for trade in trades {
            self.publisher.publish(trade);
        }
    }
}

/// A single-symbol limit order book with strict price-time priority.
///
/// All mutating operations (`submit`, `cancel`) and `snapshot` are mutually
/// exclusive for one book: the state sits behind a single mutex owned by
/// the book. Work inside the critical section is CPU-local and bounded by
/// book depth; observer hand-off is non-blocking. Independent symbols are
/// independent `OrderBook` instances and never interact.
///
/// # Examples
///
/// ```
/// use matchbook_rs::{OrderBook, OrderKind, Side};
///
/// let book = OrderBook::new("BTC-USD");
/// book.submit(Side::Sell, OrderKind::Limit, 1000, 100).unwrap();
///
/// let trades = book.submit(Side::Buy, OrderKind::Limit, 1100, 40).unwrap();
/// assert_eq!(trades.len(), 1);
/// assert_eq!(trades[0].price, 1000); // maker's price
/// assert_eq!(trades[0].quantity, 40);
/// ```
pub struct OrderBook {
    symbol: String,
    config: BookConfig,
    state: Mutex<BookState>,
}

impl OrderBook {
    /// Create a new order book for the given symbol with the default
    /// configuration.
    pub fn new(symbol: &str) -> Self {
        Self::with_config(symbol, BookConfig::default())
    }

    /// Create a new order book with an explicit configuration.
    ///
    /// # Panics
    /// Panics if `tick_size` or `lot_size` is zero.
    pub fn with_config(symbol: &str, config: BookConfig) -> Self {
        assert!(config.tick_size > 0, "tick_size must be > 0");
        assert!(config.lot_size > 0, "lot_size must be > 0");

        Self {
            symbol: symbol.to_string(),
            config,
            state: Mutex::new(BookState::new()),
        }
    }

    /// Create a new order book with a trade listener already registered.
    pub fn with_trade_listener(symbol: &str, listener: TradeListener) -> Self {
        let book = Self::new(symbol);
        book.register_trade_listener(listener);
        book
    }

    /// The symbol of this order book.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The configured minimum price increment.
    #[must_use]
    #[inline]
    pub fn tick_size(&self) -> u128 {
        self.config.tick_size
    }

    /// The configured minimum quantity increment.
    #[must_use]
    #[inline]
    pub fn lot_size(&self) -> u64 {
        self.config.lot_size
    }

    /// The maximum snapshot depth this book serves.
    #[must_use]
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.config.max_depth
    }

    /// Submit an order and return the trades it produced, in execution
    /// order.
    ///
    /// Assigns the order id, arrival sequence and timestamp, matches the
    /// order against the opposite side per its kind, rests any limit
    /// remainder, and publishes every trade to registered observers before
    /// returning. The whole operation runs under the book's lock.
    ///
    /// `price` is ignored for [`OrderKind::Market`].
    ///
    /// # Errors
    /// [`OrderBookError::InvalidQuantity`] when the quantity is zero or not
    /// a multiple of the lot size; [`OrderBookError::InvalidPrice`] when a
    /// priced order's price is zero or not a multiple of the tick size.
    /// Validation happens before any state change.
    pub fn submit(
        &self,
        side: Side,
        kind: OrderKind,
        price: u128,
        quantity: u64,
    ) -> Result<Vec<Trade>, OrderBookError> {
        if let Err(error) = self.validate(kind, price, quantity) {
            trace!(
                "Order book {}: rejected {} {} order: {}",
                self.symbol, side, kind, error
            );
            return Err(error);
        }

        let mut state = self.state.lock();
        let mut order = state.admit(side, kind, price, quantity);
        let order_id = order.id;
        trace!(
            "Order book {}: accepted order {} {} {} price {} quantity {}",
            self.symbol, order_id, side, kind, price, quantity
        );

        let trades = match kind {
            OrderKind::Fok => {
                if state.crossable_quantity(side, order.price_bound(), quantity) >= quantity {
                    let trades = state.execute_taker(&self.symbol, &mut order);
                    if order.remaining != 0 {
                        error!(
                            "fill-or-kill order {order_id} left {} unfilled after a \
                             sufficient pre-scan",
                            order.remaining
                        );
                        panic!(
                            "fill-or-kill order {order_id} left {} unfilled after a \
                             sufficient pre-scan",
                            order.remaining
                        );
                    }
                    trades
                } else {
                    Vec::new()
                }
            }
            _ => state.execute_taker(&self.symbol, &mut order),
        };

        debug_assert_eq!(
            trades.iter().map(|t| t.quantity).sum::<u64>() + order.remaining,
            order.quantity,
        );

        if kind.rests() && order.remaining > 0 {
            state.rest_order(order);
        }

        state.enforce_uncrossed(order_id);
        state.publish_trades(&trades);
        Ok(trades)
    }

    /// Submit a limit order. Any remainder rests at `price`.
    pub fn submit_limit(
        &self,
        side: Side,
        price: u128,
        quantity: u64,
    ) -> Result<Vec<Trade>, OrderBookError> {
        self.submit(side, OrderKind::Limit, price, quantity)
    }

    /// Submit a market order. The remainder, if the opposite side empties,
    /// is discarded.
    pub fn submit_market(&self, side: Side, quantity: u64) -> Result<Vec<Trade>, OrderBookError> {
        self.submit(side, OrderKind::Market, 0, quantity)
    }

    /// Submit an immediate-or-cancel order: limit crossing rule, remainder
    /// discarded.
    pub fn submit_ioc(
        &self,
        side: Side,
        price: u128,
        quantity: u64,
    ) -> Result<Vec<Trade>, OrderBookError> {
        self.submit(side, OrderKind::Ioc, price, quantity)
    }

    /// Submit a fill-or-kill order: executes fully or not at all.
    pub fn submit_fok(
        &self,
        side: Side,
        price: u128,
        quantity: u64,
    ) -> Result<Vec<Trade>, OrderBookError> {
        self.submit(side, OrderKind::Fok, price, quantity)
    }

    /// Cancel a resting order.
    ///
    /// Returns whether the order was found and removed. Idempotent:
    /// cancelling an absent or already-cancelled id returns `false` with no
    /// state change.
    pub fn cancel(&self, order_id: u64) -> bool {
        let mut state = self.state.lock();
        let cancelled = state.cancel_resting(order_id);
        trace!(
            "Order book {}: cancel order {} -> {}",
            self.symbol, order_id, cancelled
        );
        cancelled
    }

    /// Build a depth snapshot of the top `depth` levels per side,
    /// best-first.
    ///
    /// `depth` is clamped to the configured maximum. The snapshot is built
    /// under the book's lock and therefore observes a single consistent
    /// state.
    #[must_use]
    pub fn snapshot(&self, depth: usize) -> DepthSnapshot {
        let depth = depth.min(self.config.max_depth);
        let state = self.state.lock();
        DepthSnapshot {
            symbol: self.symbol.clone(),
            timestamp_ns: current_time_nanos(),
            bids: Self::collect_depth(&state.bids, depth),
            asks: Self::collect_depth(&state.asks, depth),
        }
    }

    fn collect_depth(side: &SideBook, depth: usize) -> Vec<LevelDepth> {
        side.aggregate_top(depth)
            .into_iter()
            .map(|(price, quantity)| LevelDepth { price, quantity })
            .collect()
    }

    /// Register a synchronous trade observer.
    ///
    /// The listener is invoked once per trade, in emission order, inside
    /// `submit` before it returns; it must not block. Registration is
    /// serialized with emission by the book's lock.
    pub fn register_trade_listener(&self, listener: TradeListener) -> SubscriptionId {
        self.state.lock().publisher.register(listener)
    }

    /// Remove a previously registered observer. Returns whether it was
    /// present.
    pub fn unregister_trade_listener(&self, id: SubscriptionId) -> bool {
        self.state.lock().publisher.unregister(id)
    }

    /// Open a bounded trade queue fed by this book.
    ///
    /// The queue holds up to `trade_queue_bound` trades; on overflow the
    /// oldest is dropped and counted.
    pub fn subscribe_trades(&self) -> TradeTap {
        self.state
            .lock()
            .publisher
            .subscribe(self.config.trade_queue_bound)
    }

    /// Total trade deliveries dropped across all observers of this book.
    #[must_use]
    pub fn dropped_trades(&self) -> u64 {
        self.state.lock().publisher.dropped()
    }

    /// Number of registered trade observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.state.lock().publisher.observer_count()
    }

    /// The best bid price, if any.
    #[must_use]
    pub fn best_bid(&self) -> Option<u128> {
        self.state.lock().bids.best_price()
    }

    /// The best ask price, if any.
    #[must_use]
    pub fn best_ask(&self) -> Option<u128> {
        self.state.lock().asks.best_price()
    }

    /// The top of book: best bid and best ask with their aggregate
    /// quantities, read in one critical section.
    #[must_use]
    pub fn bbo(&self) -> (Option<LevelDepth>, Option<LevelDepth>) {
        let state = self.state.lock();
        let top = |side: &SideBook| {
            side.best().map(|level| LevelDepth {
                price: level.price(),
                quantity: level.total_quantity(),
            })
        };
        (top(&state.bids), top(&state.asks))
    }

    /// The mid price (average of best bid and best ask).
    #[must_use]
    pub fn mid_price(&self) -> Option<f64> {
        let state = self.state.lock();
        match (state.bids.best_price(), state.asks.best_price()) {
            (Some(bid), Some(ask)) => Some((bid as f64 + ask as f64) / 2.0),
            _ => None,
        }
    }

    /// The spread (best ask minus best bid) in integer ticks.
    #[must_use]
    pub fn spread(&self) -> Option<u128> {
        let state = self.state.lock();
        match (state.bids.best_price(), state.asks.best_price()) {
            (Some(bid), Some(ask)) => Some(ask.saturating_sub(bid)),
            _ => None,
        }
    }

    /// The price of the most recent trade, if any trade has occurred.
    #[must_use]
    pub fn last_trade_price(&self) -> Option<u128> {
        self.state.lock().last_trade_price
    }

    /// Number of orders currently resting on the book.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.state.lock().order_index.len()
    }

    /// The resting orders at one price, in time-priority order.
    ///
    /// Returns an empty vector when no level exists at `price`.
    #[must_use]
    pub fn orders_at(&self, side: Side, price: u128) -> Vec<Order> {
        let state = self.state.lock();
        let book_side = match side {
            Side::Buy => &state.bids,
            Side::Sell => &state.asks,
        };
        book_side
            .level(price)
            .map(|level| level.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn validate(&self, kind: OrderKind, price: u128, quantity: u64) -> Result<(), OrderBookError> {
        let lot_size = self.config.lot_size;
        if quantity == 0 || quantity % lot_size != 0 {
            return Err(OrderBookError::InvalidQuantity {
                message: format!(
                    "quantity {quantity} is not a positive multiple of lot size {lot_size}"
                ),
            });
        }

        if kind.has_price() {
            let tick_size = self.config.tick_size;
            if price == 0 || price % tick_size != 0 {
                return Err(OrderBookError::InvalidPrice {
                    message: format!(
                        "price {price} is not a positive multiple of tick size {tick_size}"
                    ),
                });
            }
        }

        Ok(())
    }
}
