//! The matching core: taker execution against the opposite side.
//!
//! The matcher walks the opposite side best-first, consuming resting
//! orders in time priority at each level. Trades always execute at the
//! resting (maker) order's price. Everything here runs with the book's
//! lock held.

use tracing::error;

use super::book::BookState;
use super::trade::Trade;
use super::types::{Order, Side};
use crate::utils::current_time_nanos;

/// Whether a taker at `bound` crosses a maker level at `maker_price`.
///
/// `None` bound means any price (market orders).
#[inline]
fn crosses(taker_side: Side, bound: Option<u128>, maker_price: u128) -> bool {
    match bound {
        None => true,
        Some(limit) => match taker_side {
            Side::Buy => maker_price <= limit,
            Side::Sell => maker_price >= limit,
        },
    }
}

impl BookState {
    /// Match `taker` against the opposite side until it is filled, the
    /// crossing condition fails, or the opposite side empties.
    ///
    /// Decrements both sides per fill, pops fully filled makers, erases
    /// emptied levels, and returns the trades in execution order: levels in
    /// strictly best-first price order, makers within a level in arrival
    /// order.
    pub(super) fn execute_taker(&mut self, symbol: &str, taker: &mut Order) -> Vec<Trade> {
        let bound = taker.price_bound();
        let mut trades = Vec::new();

        while taker.remaining > 0 {
            let opposite = match taker.side {
                Side::Buy => &mut self.asks,
                Side::Sell => &mut self.bids,
            };
            let Some(level) = opposite.best_mut() else {
                break;
            };
            let level_price = level.price();
            if !crosses(taker.side, bound, level_price) {
                break;
            }

            // Consume the level in time priority.
            while taker.remaining > 0 {
                let Some(maker) = level.head() else {
                    break;
                };
                let maker_id = maker.id;
                let fill = maker.remaining.min(taker.remaining);

                trades.push(Trade {
                    trade_id: self.next_trade_id,
                    symbol: symbol.to_string(),
                    price: level_price,
                    quantity: fill,
                    timestamp_ns: current_time_nanos(),
                    maker_order_id: maker_id,
                    taker_order_id: taker.id,
                    aggressor_side: taker.side,
                });
                self.next_trade_id += 1;
                self.last_trade_price = Some(level_price);

                level.deduct_head(fill);
                taker.remaining -= fill;

                if level.head().is_some_and(|order| order.remaining == 0) {
                    if let Some(filled) = level.pop_head() {
                        self.order_index.remove(&filled.id);
                    }
                }
            }

            if level.is_empty() {
                opposite.erase(level_price);
            } else {
                // Taker exhausted against a partially consumed level.
                break;
            }
        }

        trades
    }

    /// Sum the quantity available on the opposite side at crossing prices,
    /// stopping early once `needed` is reached.
    ///
    /// Read-only: this is the fill-or-kill pre-scan that proves sufficient
    /// crossable liquidity before any state changes.
    pub(super) fn crossable_quantity(
        &self,
        taker_side: Side,
        bound: Option<u128>,
        needed: u64,
    ) -> u64 {
        let opposite = match taker_side {
            Side::Buy => &self.asks,
            Side::Sell => &self.bids,
        };

        let mut available = 0u64;
        for level in opposite.iter_from_best() {
            if available >= needed {
                break;
            }
            if !crosses(taker_side, bound, level.price()) {
                break;
            }
            available = available.saturating_add(level.total_quantity());
        }
        available
    }

    /// Place a limit remainder on its own side and index its location.
    pub(super) fn rest_order(&mut self, order: Order) {
        let (id, side, price) = (order.id, order.side, order.price);
        let book_side = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        book_side.get_or_create(price).append(order);

        if self.order_index.insert(id, (price, side)).is_some() {
            error!("duplicate order id {id} in the book index");
            panic!("duplicate order id {id} in the book index");
        }
    }

    /// Remove a resting order by id. Returns `false` when the id is not
    /// resting.
    pub(super) fn cancel_resting(&mut self, order_id: u64) -> bool {
        let Some((price, side)) = self.order_index.remove(&order_id) else {
            return false;
        };
        let book_side = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let Some(level) = book_side.level_mut(price) else {
            error!("cancel: index for order {order_id} points at missing {side} level {price}");
            panic!("cancel: index for order {order_id} points at missing {side} level {price}");
        };
        if level.remove(order_id).is_none() {
            error!("cancel: order {order_id} missing from its indexed level {price}");
            panic!("cancel: order {order_id} missing from its indexed level {price}");
        }
        if level.is_empty() {
            book_side.erase(price);
        }
        true
    }

    /// Fatal check that the book is uncrossed after a mutation.
    pub(super) fn enforce_uncrossed(&self, taker_order_id: u64) {
        if let (Some(bid), Some(ask)) = (self.bids.best_price(), self.asks.best_price()) {
            if bid >= ask {
                error!(
                    "order book crossed after order {taker_order_id}: \
                     best bid {bid} >= best ask {ask}"
                );
                panic!(
                    "order book crossed after order {taker_order_id}: \
                     best bid {bid} >= best ask {ask}"
                );
            }
        }
    }
}
