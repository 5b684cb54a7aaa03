//! Candleboard - Interactive OHLCV Charting Dashboard
//!
//! A desktop candlestick charting application backed by a chain of free
//! market-data providers. Symbols are classified as stock, crypto or forex
//! and fetched through a prioritized fallback chain; when a provider cannot
//! deliver real data it degrades to plausible synthetic candles rather than
//! failing. A small HTTP endpoint exposes the same data as JSON.

pub mod app;
pub mod chart;
pub mod market;
pub mod server;
pub mod setting;

pub use app::CandleboardApp;
pub use market::{classify, AssetType, Candle, MarketDataService, Timeframe};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
