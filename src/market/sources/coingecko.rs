//! CoinGecko spot price adapter (crypto, highest priority).
//!
//! The free endpoint only exposes a current price and 24h volume, so candles
//! are synthesized from the spot price. Binance (next in the roster) is the
//! one that returns real history.

use async_trait::async_trait;
use serde_json::Value;

use crate::market::candle::{Candle, Timeframe};
use crate::market::error::SourceError;
use crate::market::rest::RestClient;
use crate::market::source::DataSource;
use crate::market::synthetic::{random_walk, CRYPTO_WALK};

pub struct CoinGecko {
    rest: RestClient,
}

impl CoinGecko {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl DataSource for CoinGecko {
    fn name(&self) -> &'static str {
        "CoinGecko"
    }

    async fn fetch(&self, symbol: &str, _timeframe: Timeframe) -> Result<Vec<Candle>, SourceError> {
        let coin_id = symbol.to_lowercase();
        let url = format!(
            "https://api.coingecko.com/api/v3/simple/price?ids={coin_id}&vs_currencies=usd&include_market_cap=true&include_24hr_vol=true&include_last_updated_at=true"
        );

        let payload = self.rest.get_json(&url).await?;
        let coin = payload
            .get(&coin_id)
            .ok_or_else(|| SourceError::NoData(format!("coin {coin_id} not found on CoinGecko")))?;

        let price = coin
            .get("usd")
            .and_then(Value::as_f64)
            .ok_or(SourceError::Malformed {
                field: "usd",
                value: coin.to_string(),
            })?;
        let volume = coin
            .get("usd_24h_vol")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);

        Ok(random_walk(price, Some(volume), &CRYPTO_WALK))
    }
}
