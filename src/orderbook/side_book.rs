//! One side of the book: price-indexed collection of price levels.

use std::collections::BTreeMap;

use super::level::PriceLevel;
use super::types::Side;

/// Price-indexed collection of [`PriceLevel`]s for one side of the book.
///
/// Levels are kept in an ordered map, so insert and erase are O(log n) and
/// the best price (highest bid / lowest ask) is O(1) at either end of the
/// key range. Matching and snapshots iterate best-first.
#[derive(Debug)]
pub struct SideBook {
    side: Side,
    levels: BTreeMap<u128, PriceLevel>,
}

impl SideBook {
    /// Create an empty side.
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// Which side of the book this is.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// The best price on this side: the maximum for bids, the minimum for
    /// asks.
    #[must_use]
    pub fn best_price(&self) -> Option<u128> {
        match self.side {
            Side::Buy => self.levels.last_key_value().map(|(price, _)| *price),
            Side::Sell => self.levels.first_key_value().map(|(price, _)| *price),
        }
    }

    /// The level at the best price.
    #[must_use]
    pub fn best(&self) -> Option<&PriceLevel> {
        match self.side {
            Side::Buy => self.levels.last_key_value().map(|(_, level)| level),
            Side::Sell => self.levels.first_key_value().map(|(_, level)| level),
        }
    }

    /// Mutable access to the level at the best price.
    pub fn best_mut(&mut self) -> Option<&mut PriceLevel> {
        match self.side {
            Side::Buy => self.levels.values_mut().next_back(),
            Side::Sell => self.levels.values_mut().next(),
        }
    }

    /// The level at `price`, if present.
    #[must_use]
    pub fn level(&self, price: u128) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    /// Mutable access to the level at `price`, if present.
    pub fn level_mut(&mut self, price: u128) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// The level at `price`, created empty if absent.
    pub fn get_or_create(&mut self, price: u128) -> &mut PriceLevel {
        self.levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
    }

    /// Remove the level at `price`. Returns whether a level was present.
    pub fn erase(&mut self, price: u128) -> bool {
        self.levels.remove(&price).is_some()
    }

    /// Iterate levels best-first: descending prices for bids, ascending for
    /// asks.
    pub fn iter_from_best(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match self.side {
            Side::Buy => Box::new(self.levels.values().rev()),
            Side::Sell => Box::new(self.levels.values()),
        }
    }

    /// Aggregate the top `n` levels into `(price, total_quantity)` pairs,
    /// best-first. Fewer than `n` levels are returned as-is.
    #[must_use]
    pub fn aggregate_top(&self, n: usize) -> Vec<(u128, u64)> {
        self.iter_from_best()
            .take(n)
            .map(|level| (level.price(), level.total_quantity()))
            .collect()
    }

    /// Number of price levels on this side.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Whether this side holds no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Total resting quantity across all levels on this side.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.levels
            .values()
            .map(PriceLevel::total_quantity)
            .fold(0u64, u64::saturating_add)
    }
}
