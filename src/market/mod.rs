//! Market data fetching: classification, provider adapters, fallback chain
//! and synthetic generation.

pub mod candle;
pub mod classify;
pub mod error;
pub mod fetcher;
pub mod rest;
pub mod source;
pub mod sources;
pub mod synthetic;

pub use candle::{AssetType, Candle, Timeframe};
pub use classify::{classify, CRYPTO_TICKERS};
pub use error::{AllSourcesExhausted, SourceError};
pub use fetcher::{fetch_from_chain, MarketDataService};
pub use source::DataSource;
