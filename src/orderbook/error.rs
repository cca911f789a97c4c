//! Order book error types.

use std::fmt;

/// Errors surfaced by the order book and its message boundary.
///
/// Validation errors are returned before any state change. Programming
/// errors (a crossed book, an aggregate underflow, an index that disagrees
/// with the book) are not represented here: they mean the book is corrupt
/// and the offending operation panics with a diagnostic instead.
#[derive(Debug)]
#[non_exhaustive]
pub enum OrderBookError {
    /// Order price is zero, not a multiple of the tick size, or not a
    /// representable decimal at the configured scale.
    InvalidPrice {
        /// Description of the rejected price.
        message: String,
    },

    /// Order quantity is zero, not a multiple of the lot size, or not a
    /// representable decimal at the configured scale.
    InvalidQuantity {
        /// Description of the rejected quantity.
        message: String,
    },

    /// Side string outside the recognized set ("BUY" / "SELL").
    InvalidSide {
        /// The raw value that failed to parse.
        value: String,
    },

    /// Order type string outside the recognized set
    /// ("LIMIT" / "MARKET" / "IOC" / "FOK").
    InvalidOrderType {
        /// The raw value that failed to parse.
        value: String,
    },

    /// Symbol is empty or not registered.
    InvalidSymbol {
        /// The rejected symbol.
        symbol: String,
    },

    /// A boundary message is missing a required field or otherwise
    /// malformed.
    InvalidRequest {
        /// Description of the problem.
        message: String,
    },

    /// Error while serializing snapshot data.
    Serialization {
        /// Underlying error message.
        message: String,
    },

    /// Error while deserializing snapshot data.
    Deserialization {
        /// Underlying error message.
        message: String,
    },

    /// Snapshot integrity check failed.
    ChecksumMismatch {
        /// Expected checksum value.
        expected: String,
        /// Actual checksum value.
        actual: String,
    },

    /// Snapshot package was produced by an unsupported format version.
    UnsupportedSnapshotVersion {
        /// Version found in the package.
        version: u32,
        /// Version this crate understands.
        expected: u32,
    },
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::InvalidPrice { message } => {
                write!(f, "invalid price: {message}")
            }
            OrderBookError::InvalidQuantity { message } => {
                write!(f, "invalid quantity: {message}")
            }
            OrderBookError::InvalidSide { value } => {
                write!(f, "invalid side: {value:?} (expected BUY or SELL)")
            }
            OrderBookError::InvalidOrderType { value } => {
                write!(
                    f,
                    "invalid order type: {value:?} (expected LIMIT, MARKET, IOC or FOK)"
                )
            }
            OrderBookError::InvalidSymbol { symbol } => {
                write!(f, "invalid symbol: {symbol:?}")
            }
            OrderBookError::InvalidRequest { message } => {
                write!(f, "invalid request: {message}")
            }
            OrderBookError::Serialization { message } => {
                write!(f, "serialization error: {message}")
            }
            OrderBookError::Deserialization { message } => {
                write!(f, "deserialization error: {message}")
            }
            OrderBookError::ChecksumMismatch { expected, actual } => {
                write!(
                    f,
                    "checksum mismatch: expected {expected}, but computed {actual}"
                )
            }
            OrderBookError::UnsupportedSnapshotVersion { version, expected } => {
                write!(
                    f,
                    "unsupported snapshot version: {version} (expected {expected})"
                )
            }
        }
    }
}

impl std::error::Error for OrderBookError {}
