//! The fallback fetch chain.
//!
//! Each asset type owns an ordered roster of data sources. Sources are tried
//! strictly in order and the first non-empty, validated result wins; every
//! failure is recorded and reported in aggregate when the whole roster is
//! exhausted. Sources inside one fetch run sequentially on purpose: it
//! short-circuits on first success and never wastes calls on lower-priority
//! providers, at the cost of latency when an early source is slow rather
//! than absent (bounded by the per-request timeout).

use tracing::{debug, info, warn};

use super::candle::{AssetType, Candle, Timeframe};
use super::classify::classify;
use super::error::AllSourcesExhausted;
use super::rest::RestClient;
use super::source::DataSource;
use super::sources::{
    AlphaVantage, Binance, CoinGecko, ExchangerateApi, Polygon, TwelveData, Yahoo,
};
use crate::setting::SETTINGS;

/// Market data service holding the per-asset-type source rosters.
pub struct MarketDataService {
    stock_sources: Vec<Box<dyn DataSource>>,
    crypto_sources: Vec<Box<dyn DataSource>>,
    forex_sources: Vec<Box<dyn DataSource>>,
}

impl MarketDataService {
    /// Build the default rosters. API keys come from the process environment
    /// first, then the settings file; a missing key leaves the source in
    /// place but failing fast with `MissingCredential`.
    pub fn new() -> Self {
        let rest = RestClient::new();

        let alpha_vantage_key = api_key("ALPHA_VANTAGE_API_KEY", "datafeed.alpha_vantage_key");
        let twelve_data_key = api_key("TWELVE_DATA_API_KEY", "datafeed.twelve_data_key");

        Self {
            stock_sources: vec![
                Box::new(Polygon::new(rest.clone())),
                Box::new(Yahoo::new(rest.clone())),
                Box::new(AlphaVantage::new(rest.clone(), alpha_vantage_key)),
            ],
            crypto_sources: vec![
                Box::new(CoinGecko::new(rest.clone())),
                Box::new(Binance::new(rest.clone())),
            ],
            forex_sources: vec![
                Box::new(ExchangerateApi::new(rest.clone())),
                Box::new(TwelveData::new(rest, twelve_data_key)),
            ],
        }
    }

    /// The source roster for an asset type, in priority order.
    pub fn sources(&self, asset_type: AssetType) -> &[Box<dyn DataSource>] {
        match asset_type {
            AssetType::Stock => &self.stock_sources,
            AssetType::Crypto => &self.crypto_sources,
            AssetType::Forex => &self.forex_sources,
        }
    }

    /// Public entry: classify the symbol and run the fallback chain.
    pub async fn get_market_data(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>, AllSourcesExhausted> {
        let asset_type = classify(symbol);
        self.fetch_with_fallback(symbol, timeframe, asset_type).await
    }

    pub async fn fetch_with_fallback(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        asset_type: AssetType,
    ) -> Result<Vec<Candle>, AllSourcesExhausted> {
        fetch_from_chain(self.sources(asset_type), symbol, timeframe).await
    }
}

impl Default for MarketDataService {
    fn default() -> Self {
        Self::new()
    }
}

/// Try sources strictly in order, returning the first non-empty validated
/// sequence sorted oldest-to-newest. Sources disagree on raw order (Polygon
/// ascending, Twelve Data descending), so chronology is enforced here, once,
/// for every winner.
pub async fn fetch_from_chain(
    sources: &[Box<dyn DataSource>],
    symbol: &str,
    timeframe: Timeframe,
) -> Result<Vec<Candle>, AllSourcesExhausted> {
    let mut attempts: Vec<(String, String)> = Vec::new();

    for source in sources {
        debug!("trying {} for {}", source.name(), symbol);
        match source.fetch(symbol, timeframe).await {
            Ok(candles) if candles.is_empty() => {
                warn!("{} returned an empty sequence for {}", source.name(), symbol);
                attempts.push((source.name().to_string(), "empty candle sequence".to_string()));
            }
            Ok(candles) if !candles.iter().all(Candle::is_finite) => {
                warn!("{} returned non-finite values for {}", source.name(), symbol);
                attempts.push((source.name().to_string(), "non-finite candle values".to_string()));
            }
            Ok(mut candles) => {
                info!(
                    "fetched {} candles for {} from {}",
                    candles.len(),
                    symbol,
                    source.name()
                );
                candles.sort_by(|a, b| a.date.cmp(&b.date));
                return Ok(candles);
            }
            Err(e) => {
                warn!("{} failed for {}: {}", source.name(), symbol, e);
                attempts.push((source.name().to_string(), e.to_string()));
            }
        }
    }

    Err(AllSourcesExhausted {
        symbol: symbol.to_string(),
        attempts,
    })
}

/// Environment variable first, settings file second, empty counts as absent.
fn api_key(env_var: &str, setting_key: &str) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .filter(|key| !key.is_empty())
        .or_else(|| SETTINGS.get_string(setting_key).filter(|key| !key.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::error::SourceError;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StubSource {
        name: &'static str,
        candles: Option<Vec<Candle>>,
        calls: Arc<AtomicUsize>,
    }

    impl StubSource {
        fn failing(name: &'static str, calls: Arc<AtomicUsize>) -> Box<dyn DataSource> {
            Box::new(Self { name, candles: None, calls })
        }

        fn succeeding(
            name: &'static str,
            candles: Vec<Candle>,
            calls: Arc<AtomicUsize>,
        ) -> Box<dyn DataSource> {
            Box::new(Self { name, candles: Some(candles), calls })
        }
    }

    #[async_trait]
    impl DataSource for StubSource {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch(
            &self,
            _symbol: &str,
            _timeframe: Timeframe,
        ) -> Result<Vec<Candle>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.candles {
                Some(candles) => Ok(candles.clone()),
                None => Err(SourceError::NoData("stub failure".to_string())),
            }
        }
    }

    fn candle(days_ago: i64) -> Candle {
        Candle {
            date: Utc::now() - Duration::days(days_ago),
            open: 100.0,
            high: 105.0,
            low: 95.0,
            close: 102.0,
            volume: 1000.0,
        }
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let a_calls = Arc::new(AtomicUsize::new(0));
        let b_calls = Arc::new(AtomicUsize::new(0));
        let c_calls = Arc::new(AtomicUsize::new(0));

        let sources = vec![
            StubSource::failing("A", a_calls.clone()),
            StubSource::succeeding("B", vec![candle(3), candle(2), candle(1)], b_calls.clone()),
            StubSource::succeeding("C", vec![candle(9)], c_calls.clone()),
        ];

        let result = fetch_from_chain(&sources, "AAPL", Timeframe::D1).await.unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert_eq!(c_calls.load(Ordering::SeqCst), 0, "C must never be invoked");
    }

    #[tokio::test]
    async fn test_all_failures_aggregate_in_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let sources = vec![
            StubSource::failing("First", calls.clone()),
            StubSource::failing("Second", calls.clone()),
            StubSource::failing("Third", calls.clone()),
        ];

        let err = fetch_from_chain(&sources, "AAPL", Timeframe::D1).await.unwrap_err();
        assert_eq!(err.attempts.len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let message = err.to_string();
        let first = message.find("First").unwrap();
        let second = message.find("Second").unwrap();
        let third = message.find("Third").unwrap();
        assert!(first < second && second < third);
    }

    #[tokio::test]
    async fn test_empty_sequence_counts_as_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let win_calls = Arc::new(AtomicUsize::new(0));
        let sources = vec![
            StubSource::succeeding("Empty", vec![], calls.clone()),
            StubSource::succeeding("Winner", vec![candle(1)], win_calls.clone()),
        ];

        let result = fetch_from_chain(&sources, "AAPL", Timeframe::D1).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(win_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_output_is_chronological_regardless_of_raw_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        // Newest-first raw order, like Twelve Data
        let sources = vec![StubSource::succeeding(
            "Descending",
            vec![candle(1), candle(2), candle(5), candle(3)],
            calls,
        )];

        let result = fetch_from_chain(&sources, "EURUSD", Timeframe::D1).await.unwrap();
        for pair in result.windows(2) {
            assert!(pair[0].date <= pair[1].date);
        }
    }

    #[tokio::test]
    async fn test_non_finite_candles_count_as_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut bad = candle(1);
        bad.close = f64::NAN;
        let sources = vec![StubSource::succeeding("NaN", vec![bad], calls)];

        let err = fetch_from_chain(&sources, "AAPL", Timeframe::D1).await.unwrap_err();
        assert_eq!(err.attempts[0].1, "non-finite candle values");
    }

    #[test]
    fn test_roster_priority_order() {
        let service = MarketDataService::new();

        let stock: Vec<_> = service.sources(AssetType::Stock).iter().map(|s| s.name()).collect();
        assert_eq!(stock, vec!["Polygon.io", "Yahoo Finance", "Alpha Vantage"]);

        let crypto: Vec<_> = service.sources(AssetType::Crypto).iter().map(|s| s.name()).collect();
        assert_eq!(crypto, vec!["CoinGecko", "Binance"]);

        let forex: Vec<_> = service.sources(AssetType::Forex).iter().map(|s| s.name()).collect();
        assert_eq!(forex, vec!["Exchangerate-API", "Twelve Data"]);
    }
}
