//! Trade records and fan-out of executed trades to observers.
//!
//! Two observation styles are supported, both registered through the book
//! so registration can never race with emission:
//!
//! - **Callbacks** ([`TradeListener`]): invoked synchronously inside the
//!   submission path, once per trade, in emission order. Callbacks must not
//!   block; a callback that panics is unregistered and the lost delivery is
//!   counted, so a misbehaving observer can never stall or poison the
//!   matcher.
//! - **Taps** ([`TradeTap`]): a bounded lock-free queue the book pushes
//!   into without blocking. On overflow the oldest trade is dropped and a
//!   counter incremented, observable through [`TradeTap::dropped`] and the
//!   book's status accessor.

use crossbeam::queue::ArrayQueue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;
use uuid::Uuid;

use super::types::Side;

/// An executed trade.
///
/// Immutable once created by the matcher. `price` is always the resting
/// (maker) order's price; `aggressor_side` is the side of the incoming
/// taker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Monotonically increasing identifier across the life of the book.
    pub trade_id: u64,
    /// The symbol this trade belongs to.
    pub symbol: String,
    /// Execution price in integer ticks (the maker's limit price).
    pub price: u128,
    /// Executed quantity in integer lots.
    pub quantity: u64,
    /// Execution time, nanoseconds since the Unix epoch.
    pub timestamp_ns: u64,
    /// The resting order consumed by this trade.
    pub maker_order_id: u64,
    /// The incoming order that crossed.
    pub taker_order_id: u64,
    /// Side of the taker.
    pub aggressor_side: Side,
}

/// Synchronous trade observer.
///
/// Invoked under the book's lock; implementations must return promptly and
/// must not block on I/O or other locks.
pub type TradeListener = Arc<dyn Fn(&Trade) + Send + Sync>;

/// Handle identifying a registered observer, returned on registration and
/// used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub(super) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct TapShared {
    queue: ArrayQueue<Trade>,
    dropped: AtomicU64,
}

/// Consumer end of a bounded trade queue subscription.
///
/// The book pushes executed trades into the queue without blocking; when
/// the queue is full the oldest entry is discarded and counted. Consumers
/// poll with [`TradeTap::try_next`] or [`TradeTap::drain`] from any thread.
pub struct TradeTap {
    id: SubscriptionId,
    shared: Arc<TapShared>,
}

impl TradeTap {
    /// The subscription handle, for unregistering.
    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Pop the oldest queued trade, if any.
    pub fn try_next(&self) -> Option<Trade> {
        self.shared.queue.pop()
    }

    /// Pop everything currently queued, oldest first.
    pub fn drain(&self) -> Vec<Trade> {
        let mut trades = Vec::new();
        while let Some(trade) = self.shared.queue.pop() {
            trades.push(trade);
        }
        trades
    }

    /// Number of trades currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.queue.len()
    }

    /// Whether the queue is currently empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.queue.is_empty()
    }

    /// Number of trades dropped from this tap due to overflow.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.shared.dropped.load(Ordering::Relaxed)
    }
}

enum Subscriber {
    Callback(TradeListener),
    Tap(Arc<TapShared>),
}

/// Fan-out of emitted trades to all registered observers.
///
/// Owned by the book state and therefore always driven under the book's
/// lock; emission order is exactly the matcher's emission order.
pub(super) struct TradePublisher {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    dropped: u64,
}

impl TradePublisher {
    pub(super) fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            dropped: 0,
        }
    }

    pub(super) fn register(&mut self, listener: TradeListener) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.subscribers.push((id, Subscriber::Callback(listener)));
        id
    }

    pub(super) fn subscribe(&mut self, bound: usize) -> TradeTap {
        let id = SubscriptionId::new();
        let shared = Arc::new(TapShared {
            queue: ArrayQueue::new(bound.max(1)),
            dropped: AtomicU64::new(0),
        });
        self.subscribers
            .push((id, Subscriber::Tap(Arc::clone(&shared))));
        TradeTap { id, shared }
    }

    pub(super) fn unregister(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    /// Deliver one trade to every observer, in registration order.
    ///
    /// A panicking callback is unregistered; a full tap drops its oldest
    /// entry. Both are counted as dropped deliveries.
    pub(super) fn publish(&mut self, trade: &Trade) {
        let mut panicked: Vec<SubscriptionId> = Vec::new();
        for (id, subscriber) in &self.subscribers {
            match subscriber {
                Subscriber::Callback(listener) => {
                    let listener = Arc::clone(listener);
                    if catch_unwind(AssertUnwindSafe(|| listener(trade))).is_err() {
                        warn!(
                            "trade listener {} panicked on trade {}; unregistering",
                            id, trade.trade_id
                        );
                        panicked.push(*id);
                        self.dropped += 1;
                    }
                }
                Subscriber::Tap(shared) => {
                    if shared.queue.force_push(trade.clone()).is_some() {
                        shared.dropped.fetch_add(1, Ordering::Relaxed);
                        self.dropped += 1;
                    }
                }
            }
        }
        if !panicked.is_empty() {
            self.subscribers
                .retain(|(sub_id, _)| !panicked.contains(sub_id));
        }
    }

    /// Total deliveries lost across all observers: tap overflows plus
    /// trades lost to unregistered panicking callbacks.
    pub(super) fn dropped(&self) -> u64 {
        self.dropped
    }

    pub(super) fn observer_count(&self) -> usize {
        self.subscribers.len()
    }
}
