//! Prelude module that re-exports commonly used types and traits.
//!
//! Instead of importing each type individually, you can use:
//!
//! ```rust
//! use matchbook_rs::prelude::*;
//! ```

// Core order book types
pub use crate::orderbook::{BookConfig, OrderBook, OrderBookError};

// Book structure types
pub use crate::orderbook::{PriceLevel, SideBook};

// Order domain types
pub use crate::orderbook::{Order, OrderKind, Side};

// Trade publication types
pub use crate::orderbook::{SubscriptionId, Trade, TradeListener, TradeTap};

// Snapshot types
pub use crate::orderbook::{DepthSnapshot, LevelDepth, SnapshotPackage};

// Multi-book management
pub use crate::orderbook::manager::{BookManager, BookManagerStd, BookManagerTokio};

// Boundary message contracts
pub use crate::orderbook::messages::{
    DepthLevelMessage, DepthMessage, RawDecimal, SubmitCommand, SubmitRequest, SubmitResponse,
    TradeMessage, WireScale,
};

// Utility functions
pub use crate::utils::current_time_nanos;
