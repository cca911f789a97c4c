//! Multi-book management with centralized trade event routing.
//!
//! Books are independent [`OrderBook`] instances behind `Arc`, keyed by
//! symbol in a concurrent map. Per-symbol exclusion lives on each book, not
//! on the registry, so adding or removing symbols never interacts with
//! matching. Two manager variants route trade events through a channel: a
//! standard-library one (`BookManagerStd`) and a Tokio one
//! (`BookManagerTokio`).

use dashmap::DashMap;
use std::sync::Arc;
use tracing::{error, info};

use super::book::{BookConfig, OrderBook};
use super::error::OrderBookError;
use super::trade::{Trade, TradeListener};

/// Registry of order books keyed by symbol, with centralized trade
/// routing.
///
/// Implementations differ only in the channel type used to move trade
/// events out of the submission path.
pub trait BookManager {
    /// Add (or fetch) the order book for a symbol, with the routing trade
    /// listener registered.
    ///
    /// # Errors
    /// [`OrderBookError::InvalidSymbol`] when the symbol is empty.
    fn add_book(&self, symbol: &str) -> Result<Arc<OrderBook>, OrderBookError>;

    /// The order book for a symbol, if registered.
    fn book(&self, symbol: &str) -> Option<Arc<OrderBook>>;

    /// All registered symbols.
    fn symbols(&self) -> Vec<String>;

    /// Remove the order book for a symbol, returning it if present.
    fn remove_book(&self, symbol: &str) -> Option<Arc<OrderBook>>;

    /// Whether a book exists for the symbol.
    fn has_book(&self, symbol: &str) -> bool;

    /// Number of registered books.
    fn book_count(&self) -> usize;
}

fn validate_symbol(symbol: &str) -> Result<(), OrderBookError> {
    if symbol.trim().is_empty() {
        return Err(OrderBookError::InvalidSymbol {
            symbol: symbol.to_string(),
        });
    }
    Ok(())
}

fn log_trade(trade: &Trade) {
    info!(
        "Trade {} on {}: {} @ {} (maker {}, taker {}, aggressor {})",
        trade.trade_id,
        trade.symbol,
        trade.quantity,
        trade.price,
        trade.maker_order_id,
        trade.taker_order_id,
        trade.aggressor_side
    );
}

/// [`BookManager`] implementation using standard library mpsc channels.
pub struct BookManagerStd {
    books: DashMap<String, Arc<OrderBook>>,
    config: BookConfig,
    trade_sender: std::sync::mpsc::Sender<Trade>,
    trade_receiver: parking_lot::Mutex<Option<std::sync::mpsc::Receiver<Trade>>>,
}

impl BookManagerStd {
    /// Create a manager whose books use the default configuration.
    pub fn new() -> Self {
        Self::with_config(BookConfig::default())
    }

    /// Create a manager whose books use the given configuration.
    pub fn with_config(config: BookConfig) -> Self {
        let (sender, receiver) = std::sync::mpsc::channel();
        Self {
            books: DashMap::new(),
            config,
            trade_sender: sender,
            trade_receiver: parking_lot::Mutex::new(Some(receiver)),
        }
    }

    /// Start the trade event processor in a separate thread.
    ///
    /// # Panics
    /// Panics if the processor was already started.
    pub fn start_trade_processor(&self) -> std::thread::JoinHandle<()> {
        let receiver = self
            .trade_receiver
            .lock()
            .take()
            .expect("trade processor already started");

        std::thread::spawn(move || {
            info!("Trade processor started");
            while let Ok(trade) = receiver.recv() {
                log_trade(&trade);
            }
            info!("Trade processor stopped");
        })
    }

    fn routing_listener(&self, symbol: &str) -> TradeListener {
        let sender = self.trade_sender.clone();
        let symbol = symbol.to_string();
        Arc::new(move |trade: &Trade| {
            if sender.send(trade.clone()).is_err() {
                error!("Failed to route trade event for {}", symbol);
            }
        })
    }
}

impl BookManager for BookManagerStd {
    fn add_book(&self, symbol: &str) -> Result<Arc<OrderBook>, OrderBookError> {
        validate_symbol(symbol)?;
        if let Some(existing) = self.books.get(symbol) {
            return Ok(Arc::clone(existing.value()));
        }

        let listener = self.routing_listener(symbol);
        let book = Arc::new(OrderBook::with_config(symbol, self.config));
        book.register_trade_listener(listener);
        self.books.insert(symbol.to_string(), Arc::clone(&book));
        info!("Added order book for symbol: {}", symbol);
        Ok(book)
    }

    fn book(&self, symbol: &str) -> Option<Arc<OrderBook>> {
        self.books.get(symbol).map(|entry| Arc::clone(entry.value()))
    }

    fn symbols(&self) -> Vec<String> {
        self.books.iter().map(|entry| entry.key().clone()).collect()
    }

    fn remove_book(&self, symbol: &str) -> Option<Arc<OrderBook>> {
        let removed = self.books.remove(symbol).map(|(_, book)| book);
        if removed.is_some() {
            info!("Removed order book for symbol: {}", symbol);
        }
        removed
    }

    fn has_book(&self, symbol: &str) -> bool {
        self.books.contains_key(symbol)
    }

    fn book_count(&self) -> usize {
        self.books.len()
    }
}

impl Default for BookManagerStd {
    fn default() -> Self {
        Self::new()
    }
}

/// [`BookManager`] implementation using Tokio mpsc channels.
pub struct BookManagerTokio {
    books: DashMap<String, Arc<OrderBook>>,
    config: BookConfig,
    trade_sender: tokio::sync::mpsc::UnboundedSender<Trade>,
    trade_receiver: parking_lot::Mutex<Option<tokio::sync::mpsc::UnboundedReceiver<Trade>>>,
}

impl BookManagerTokio {
    /// Create a manager whose books use the default configuration.
    pub fn new() -> Self {
        Self::with_config(BookConfig::default())
    }

    /// Create a manager whose books use the given configuration.
    pub fn with_config(config: BookConfig) -> Self {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        Self {
            books: DashMap::new(),
            config,
            trade_sender: sender,
            trade_receiver: parking_lot::Mutex::new(Some(receiver)),
        }
    }

    /// Start the trade event processor as an async task.
    ///
    /// # Panics
    /// Panics if the processor was already started.
    pub fn start_trade_processor(&self) -> tokio::task::JoinHandle<()> {
        let mut receiver = self
            .trade_receiver
            .lock()
            .take()
            .expect("trade processor already started");

        tokio::spawn(async move {
            info!("Trade processor started (Tokio)");
            while let Some(trade) = receiver.recv().await {
                log_trade(&trade);
            }
            info!("Trade processor stopped (Tokio)");
        })
    }

    fn routing_listener(&self, symbol: &str) -> TradeListener {
        let sender = self.trade_sender.clone();
        let symbol = symbol.to_string();
        Arc::new(move |trade: &Trade| {
            if sender.send(trade.clone()).is_err() {
                error!("Failed to route trade event for {}", symbol);
            }
        })
    }
}

impl BookManager for BookManagerTokio {
    fn add_book(&self, symbol: &str) -> Result<Arc<OrderBook>, OrderBookError> {
        validate_symbol(symbol)?;
        if let Some(existing) = self.books.get(symbol) {
            return Ok(Arc::clone(existing.value()));
        }

        let listener = self.routing_listener(symbol);
        let book = Arc::new(OrderBook::with_config(symbol, self.config));
        book.register_trade_listener(listener);
        self.books.insert(symbol.to_string(), Arc::clone(&book));
        info!("Added order book for symbol: {}", symbol);
        Ok(book)
    }

    fn book(&self, symbol: &str) -> Option<Arc<OrderBook>> {
        self.books.get(symbol).map(|entry| Arc::clone(entry.value()))
    }

    fn symbols(&self) -> Vec<String> {
        self.books.iter().map(|entry| entry.key().clone()).collect()
    }

    fn remove_book(&self, symbol: &str) -> Option<Arc<OrderBook>> {
        let removed = self.books.remove(symbol).map(|(_, book)| book);
        if removed.is_some() {
            info!("Removed order book for symbol: {}", symbol);
        }
        removed
    }

    fn has_book(&self, symbol: &str) -> bool {
        self.books.contains_key(symbol)
    }

    fn book_count(&self) -> usize {
        self.books.len()
    }
}

impl Default for BookManagerTokio {
    fn default() -> Self {
        Self::new()
    }
}
