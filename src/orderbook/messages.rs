//! Boundary message contracts and the decimal ↔ integer-units conversion.
//!
//! The core works exclusively in integer ticks and lots; collaborators
//! speak decimals. Conversion happens exactly once, here:
//!
//! - String inputs are parsed digit-by-digit and are exact. Input with
//!   non-zero digits finer than the configured scale is rejected.
//! - Float inputs (JSON numbers) are scaled and rounded half-away-from-zero;
//!   a value that is not within a relative tolerance of `1e-9` of a whole
//!   number of units is rejected as finer than the scale.
//!
//! Outbound decimals are always rendered as strings at the full configured
//! scale, so consumers never see floating point artifacts.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::OrderBookError;
use super::snapshot::DepthSnapshot;
use super::trade::Trade;
use super::types::{OrderKind, Side};

/// Relative tolerance for accepting a float as a whole number of units.
const FLOAT_UNIT_TOLERANCE: f64 = 1e-9;

fn pow10(scale: u32) -> u128 {
    10u128.pow(scale)
}

/// Decimal place counts used when converting boundary values to the core's
/// integer units.
///
/// With the default `price_scale` of 2, one price unit is 0.01 — the
/// default tick — and `"10.50"` becomes 1050 units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireScale {
    /// Decimal places carried by prices.
    pub price_scale: u32,
    /// Decimal places carried by quantities.
    pub quantity_scale: u32,
}

impl Default for WireScale {
    fn default() -> Self {
        Self {
            price_scale: 2,
            quantity_scale: 8,
        }
    }
}

/// A decimal value as received from a collaborator: either a JSON number
/// or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDecimal {
    /// JSON number form, e.g. `101.5`.
    Number(f64),
    /// String form, e.g. `"101.50"`. Parsed exactly.
    Text(String),
}

impl RawDecimal {
    /// Convert to integer units at the given scale.
    ///
    /// Returns `None` for negative, non-finite, unparseable, overflowing,
    /// or finer-than-scale input.
    #[must_use]
    pub fn to_units(&self, scale: u32) -> Option<u128> {
        match self {
            RawDecimal::Number(value) => float_to_units(*value, scale),
            RawDecimal::Text(text) => text_to_units(text, scale),
        }
    }
}

impl fmt::Display for RawDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawDecimal::Number(value) => write!(f, "{value}"),
            RawDecimal::Text(text) => write!(f, "{text}"),
        }
    }
}

fn float_to_units(value: f64, scale: u32) -> Option<u128> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let scaled = value * pow10(scale) as f64;
    // Past 2^63 the f64 grid is coarser than one unit; treat as overflow.
    if scaled > u64::MAX as f64 {
        return None;
    }
    let rounded = scaled.round();
    if (scaled - rounded).abs() > FLOAT_UNIT_TOLERANCE * scaled.max(1.0) {
        return None;
    }
    Some(rounded as u128)
}

fn text_to_units(text: &str, scale: u32) -> Option<u128> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return None;
    }

    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (text, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if frac_part.contains('.') {
        return None;
    }

    let scale = scale as usize;
    if frac_part.len() > scale && frac_part[scale..].bytes().any(|b| b != b'0') {
        return None;
    }
    let frac_kept = &frac_part[..frac_part.len().min(scale)];

    let int_units: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };
    let frac_units: u128 = if frac_kept.is_empty() {
        0
    } else {
        frac_kept.parse::<u128>().ok()? * pow10((scale - frac_kept.len()) as u32)
    };

    int_units
        .checked_mul(pow10(scale as u32))?
        .checked_add(frac_units)
}

/// Render integer units as a decimal string at the given scale.
#[must_use]
pub fn units_to_decimal(units: u128, scale: u32) -> String {
    if scale == 0 {
        return units.to_string();
    }
    let base = pow10(scale);
    format!(
        "{}.{:0width$}",
        units / base,
        units % base,
        width = scale as usize
    )
}

/// An order submission as received from the HTTP collaborator.
///
/// Unknown fields are ignored; missing required fields fail at
/// deserialization with the collaborator's `InvalidRequest` handling.
/// `price` is optional and ignored for market orders.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitRequest {
    /// Trading pair, e.g. `"BTC-USD"`.
    pub symbol: String,
    /// `"BUY"` or `"SELL"` (case-insensitive).
    pub side: String,
    /// `"LIMIT"`, `"MARKET"`, `"IOC"` or `"FOK"` (case-insensitive).
    pub order_type: String,
    /// Decimal limit price; required for priced order types.
    #[serde(default)]
    pub price: Option<RawDecimal>,
    /// Decimal order quantity.
    pub quantity: RawDecimal,
}

/// A fully validated submission in core units, ready for
/// [`super::book::OrderBook::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitCommand {
    /// Trading pair.
    pub symbol: String,
    /// Parsed side.
    pub side: Side,
    /// Parsed order kind.
    pub kind: OrderKind,
    /// Price in integer ticks; zero for market orders.
    pub price: u128,
    /// Quantity in integer lots.
    pub quantity: u64,
}

impl SubmitRequest {
    /// Parse and convert this request into core units.
    ///
    /// # Errors
    /// `InvalidSymbol` for an empty symbol, `InvalidSide` /
    /// `InvalidOrderType` for unrecognized enum strings, `InvalidRequest`
    /// when a priced order omits its price, and `InvalidPrice` /
    /// `InvalidQuantity` for unconvertible decimals.
    pub fn into_command(self, scale: WireScale) -> Result<SubmitCommand, OrderBookError> {
        if self.symbol.trim().is_empty() {
            return Err(OrderBookError::InvalidSymbol {
                symbol: self.symbol,
            });
        }

        let side: Side = self.side.parse()?;
        let kind: OrderKind = self.order_type.parse()?;

        let quantity_units = self
            .quantity
            .to_units(scale.quantity_scale)
            .ok_or_else(|| OrderBookError::InvalidQuantity {
                message: format!(
                    "quantity {} is not a valid decimal at scale {}",
                    self.quantity, scale.quantity_scale
                ),
            })?;
        let quantity =
            u64::try_from(quantity_units).map_err(|_| OrderBookError::InvalidQuantity {
                message: format!("quantity {} overflows the lot range", self.quantity),
            })?;

        let price = if kind.has_price() {
            let raw = self
                .price
                .as_ref()
                .ok_or_else(|| OrderBookError::InvalidRequest {
                    message: format!("price is required for {kind} orders"),
                })?;
            raw.to_units(scale.price_scale)
                .ok_or_else(|| OrderBookError::InvalidPrice {
                    message: format!(
                        "price {raw} is not a valid decimal at scale {}",
                        scale.price_scale
                    ),
                })?
        } else {
            0
        };

        Ok(SubmitCommand {
            symbol: self.symbol,
            side,
            kind,
            price,
            quantity,
        })
    }
}

/// A trade record as published to external observers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeMessage {
    /// Monotonic trade identifier.
    pub trade_id: u64,
    /// Trading pair.
    pub symbol: String,
    /// Execution price, decimal string.
    pub price: String,
    /// Executed quantity, decimal string.
    pub quantity: String,
    /// Execution time, nanoseconds since the Unix epoch.
    pub timestamp_ns: u64,
    /// The resting order consumed by this trade.
    pub maker_order_id: u64,
    /// The incoming order that crossed.
    pub taker_order_id: u64,
    /// Side of the taker.
    pub aggressor_side: Side,
}

impl TradeMessage {
    /// Render a core trade in boundary form.
    #[must_use]
    pub fn from_trade(trade: &Trade, scale: WireScale) -> Self {
        Self {
            trade_id: trade.trade_id,
            symbol: trade.symbol.clone(),
            price: units_to_decimal(trade.price, scale.price_scale),
            quantity: units_to_decimal(u128::from(trade.quantity), scale.quantity_scale),
            timestamp_ns: trade.timestamp_ns,
            maker_order_id: trade.maker_order_id,
            taker_order_id: trade.taker_order_id,
            aggressor_side: trade.aggressor_side,
        }
    }
}

/// Response to an order submission.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SubmitResponse {
    /// The order was accepted; zero or more trades executed.
    Success {
        /// Trading pair.
        symbol: String,
        /// Number of trades executed.
        trades_executed: usize,
        /// Quantity not executed by this submission: the resting remainder
        /// for limit orders, the discarded remainder for market and IOC.
        quantity_unfilled: String,
        /// The executed trades, in execution order.
        trades: Vec<TradeMessage>,
    },
    /// The order was rejected before any state change.
    Error {
        /// Human-readable rejection reason.
        message: String,
    },
}

impl SubmitResponse {
    /// Build the success response for a submission of `quantity` lots that
    /// produced `trades`.
    #[must_use]
    pub fn success(symbol: &str, quantity: u64, trades: &[Trade], scale: WireScale) -> Self {
        let executed: u64 = trades.iter().map(|trade| trade.quantity).sum();
        SubmitResponse::Success {
            symbol: symbol.to_string(),
            trades_executed: trades.len(),
            quantity_unfilled: units_to_decimal(
                u128::from(quantity.saturating_sub(executed)),
                scale.quantity_scale,
            ),
            trades: trades
                .iter()
                .map(|trade| TradeMessage::from_trade(trade, scale))
                .collect(),
        }
    }

    /// Build the error response for a rejected submission.
    #[must_use]
    pub fn failure(error: &OrderBookError) -> Self {
        SubmitResponse::Error {
            message: error.to_string(),
        }
    }
}

/// One aggregated level in a depth message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthLevelMessage {
    /// Level price, decimal string.
    pub price: String,
    /// Total resting quantity, decimal string.
    pub quantity: String,
}

/// A depth snapshot as consumed by the market-data collaborator: bids
/// descending by price, asks ascending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthMessage {
    /// Bid levels, best first.
    pub bids: Vec<DepthLevelMessage>,
    /// Ask levels, best first.
    pub asks: Vec<DepthLevelMessage>,
}

impl DepthMessage {
    /// Render a core snapshot in boundary form.
    #[must_use]
    pub fn from_snapshot(snapshot: &DepthSnapshot, scale: WireScale) -> Self {
        let render = |levels: &[super::snapshot::LevelDepth]| {
            levels
                .iter()
                .map(|level| DepthLevelMessage {
                    price: units_to_decimal(level.price, scale.price_scale),
                    quantity: units_to_decimal(u128::from(level.quantity), scale.quantity_scale),
                })
                .collect()
        };
        Self {
            bids: render(&snapshot.bids),
            asks: render(&snapshot.asks),
        }
    }
}
