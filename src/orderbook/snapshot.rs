//! Depth-of-book snapshots for market data.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::OrderBookError;

/// One aggregated price level in a snapshot: price and total resting
/// quantity. No order identities leak into snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDepth {
    /// Level price in integer ticks.
    pub price: u128,
    /// Total resting quantity at this price, in integer lots.
    pub quantity: u64,
}

/// A point-in-time consistent view of the top of the book.
///
/// Built under the same exclusion that serializes submissions, so the
/// snapshot reflects exactly the set of submit/cancel calls that preceded
/// it. Bids are ordered by descending price, asks by ascending price; both
/// are truncated to the requested depth with no padding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthSnapshot {
    /// The symbol this snapshot belongs to.
    pub symbol: String,
    /// Creation time, nanoseconds since the Unix epoch.
    pub timestamp_ns: u64,
    /// Bid levels, best (highest price) first.
    pub bids: Vec<LevelDepth>,
    /// Ask levels, best (lowest price) first.
    pub asks: Vec<LevelDepth>,
}

impl DepthSnapshot {
    /// The best bid level, if any.
    #[must_use]
    pub fn best_bid(&self) -> Option<LevelDepth> {
        self.bids.first().copied()
    }

    /// The best ask level, if any.
    #[must_use]
    pub fn best_ask(&self) -> Option<LevelDepth> {
        self.asks.first().copied()
    }

    /// Mid price (average of best bid and best ask).
    #[must_use]
    pub fn mid_price(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid.price as f64 + ask.price as f64) / 2.0),
            _ => None,
        }
    }

    /// Spread (best ask minus best bid) in integer ticks.
    #[must_use]
    pub fn spread(&self) -> Option<u128> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.price.saturating_sub(bid.price)),
            _ => None,
        }
    }

    /// Total quantity across the included bid levels.
    #[must_use]
    pub fn total_bid_quantity(&self) -> u64 {
        self.bids
            .iter()
            .map(|level| level.quantity)
            .fold(0u64, u64::saturating_add)
    }

    /// Total quantity across the included ask levels.
    #[must_use]
    pub fn total_ask_quantity(&self) -> u64 {
        self.asks
            .iter()
            .map(|level| level.quantity)
            .fold(0u64, u64::saturating_add)
    }
}

/// Format version used for checksum-enabled depth snapshots.
pub const DEPTH_SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Wrapper that provides checksum validation for [`DepthSnapshot`]
/// instances handed off between processes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPackage {
    /// Version of the snapshot schema for forward compatibility.
    pub version: u32,
    /// Snapshot payload.
    pub snapshot: DepthSnapshot,
    /// Hex-encoded SHA-256 checksum of the serialized snapshot.
    pub checksum: String,
}

impl SnapshotPackage {
    /// Creates a new package computing the checksum of the snapshot
    /// contents.
    pub fn new(snapshot: DepthSnapshot) -> Result<Self, OrderBookError> {
        let checksum = Self::compute_checksum(&snapshot)?;
        Ok(Self {
            version: DEPTH_SNAPSHOT_FORMAT_VERSION,
            snapshot,
            checksum,
        })
    }

    /// Serializes the package to JSON.
    pub fn to_json(&self) -> Result<String, OrderBookError> {
        serde_json::to_string(self).map_err(|error| OrderBookError::Serialization {
            message: error.to_string(),
        })
    }

    /// Deserializes the package from JSON.
    pub fn from_json(data: &str) -> Result<Self, OrderBookError> {
        serde_json::from_str(data).map_err(|error| OrderBookError::Deserialization {
            message: error.to_string(),
        })
    }

    /// Validates the checksum and version.
    pub fn validate(&self) -> Result<(), OrderBookError> {
        if self.version != DEPTH_SNAPSHOT_FORMAT_VERSION {
            return Err(OrderBookError::UnsupportedSnapshotVersion {
                version: self.version,
                expected: DEPTH_SNAPSHOT_FORMAT_VERSION,
            });
        }

        let computed = Self::compute_checksum(&self.snapshot)?;
        if computed != self.checksum {
            return Err(OrderBookError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual: computed,
            });
        }

        Ok(())
    }

    /// Consumes the package and returns the validated snapshot.
    pub fn into_snapshot(self) -> Result<DepthSnapshot, OrderBookError> {
        self.validate()?;
        Ok(self.snapshot)
    }

    fn compute_checksum(snapshot: &DepthSnapshot) -> Result<String, OrderBookError> {
        let payload =
            serde_json::to_vec(snapshot).map_err(|error| OrderBookError::Serialization {
                message: error.to_string(),
            })?;

        let mut hasher = Sha256::new();
        hasher.update(payload);

        let checksum_bytes = hasher.finalize();
        Ok(checksum_bytes
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect::<String>())
    }
}
