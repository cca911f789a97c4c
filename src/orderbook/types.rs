//! Core domain types: order sides, order kinds and the order value object.
//!
//! Prices are `u128` integer ticks and quantities are `u64` integer lots.
//! All comparisons and aggregates are exact integer arithmetic; the boundary
//! layer in [`crate::orderbook::messages`] converts decimal text to these
//! units exactly once.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::OrderBookError;

/// Side of the book an order belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Bid side; a buy order matches against asks.
    Buy,
    /// Ask side; a sell order matches against bids.
    Sell,
}

impl Side {
    /// The side an incoming order of this side matches against.
    #[must_use]
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for Side {
    type Err = OrderBookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(OrderBookError::InvalidSide {
                value: s.to_string(),
            }),
        }
    }
}

/// Execution policy of an incoming order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    /// Match while crossing; any remainder rests at the limit price.
    Limit,
    /// Match at any price until filled or the opposite side empties;
    /// the remainder is discarded.
    Market,
    /// Immediate-or-cancel: limit crossing rule, remainder discarded.
    Ioc,
    /// Fill-or-kill: execute fully or not at all.
    Fok,
}

impl OrderKind {
    /// Whether an unfilled remainder of this kind rests on the book.
    #[must_use]
    pub fn rests(&self) -> bool {
        matches!(self, OrderKind::Limit)
    }

    /// Whether this kind carries a limit price.
    #[must_use]
    pub fn has_price(&self) -> bool {
        !matches!(self, OrderKind::Market)
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Limit => write!(f, "LIMIT"),
            OrderKind::Market => write!(f, "MARKET"),
            OrderKind::Ioc => write!(f, "IOC"),
            OrderKind::Fok => write!(f, "FOK"),
        }
    }
}

impl FromStr for OrderKind {
    type Err = OrderBookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LIMIT" => Ok(OrderKind::Limit),
            "MARKET" => Ok(OrderKind::Market),
            "IOC" => Ok(OrderKind::Ioc),
            "FOK" => Ok(OrderKind::Fok),
            _ => Err(OrderBookError::InvalidOrderType {
                value: s.to_string(),
            }),
        }
    }
}

/// A single order as tracked by the book.
///
/// Created on submission with `remaining == quantity`; only the matcher
/// decrements `remaining`. `id` and `arrival_seq` are monotonic within one
/// book and together define time priority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique, monotonically increasing identifier within the book.
    pub id: u64,
    /// Buy or sell.
    pub side: Side,
    /// Execution policy.
    pub kind: OrderKind,
    /// Limit price in integer ticks. Zero for market orders (no bound).
    pub price: u128,
    /// Quantity at submission, in integer lots.
    pub quantity: u64,
    /// Quantity not yet filled or cancelled.
    pub remaining: u64,
    /// Position in the book-wide arrival order.
    pub arrival_seq: u64,
    /// Admission time, nanoseconds since the Unix epoch.
    pub timestamp_ns: u64,
}

impl Order {
    /// Quantity executed so far.
    #[must_use]
    pub fn filled(&self) -> u64 {
        self.quantity - self.remaining
    }

    /// Whether the order is completely filled.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.remaining == 0
    }

    /// The price bound the matcher honours for this order.
    ///
    /// `None` means any price (market orders).
    #[must_use]
    pub fn price_bound(&self) -> Option<u128> {
        match self.kind {
            OrderKind::Market => None,
            _ => Some(self.price),
        }
    }
}
