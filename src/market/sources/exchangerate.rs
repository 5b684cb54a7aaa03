//! Exchangerate-API adapter (forex, highest priority).
//!
//! Exposes only current rates, so the series is a tight synthetic walk
//! around the live rate.

use async_trait::async_trait;
use serde_json::Value;

use crate::market::candle::{Candle, Timeframe};
use crate::market::error::SourceError;
use crate::market::rest::RestClient;
use crate::market::source::DataSource;
use crate::market::synthetic::{random_walk, FOREX_WALK};

pub struct ExchangerateApi {
    rest: RestClient,
}

impl ExchangerateApi {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl DataSource for ExchangerateApi {
    fn name(&self) -> &'static str {
        "Exchangerate-API"
    }

    async fn fetch(&self, symbol: &str, _timeframe: Timeframe) -> Result<Vec<Candle>, SourceError> {
        // Classification guarantees six letters, but the adapter can be
        // called directly with anything.
        let (from, to) = match (symbol.get(0..3), symbol.get(3..6)) {
            (Some(from), Some(to)) => (from, to),
            _ => {
                return Err(SourceError::Malformed {
                    field: "symbol",
                    value: symbol.to_string(),
                })
            }
        };

        let url = format!("https://api.exchangerate-api.com/v4/latest/{from}");
        let payload = self.rest.get_json(&url).await?;

        let rate = payload
            .pointer(&format!("/rates/{to}"))
            .and_then(Value::as_f64)
            .ok_or_else(|| SourceError::NoData(format!("currency pair {symbol} not found")))?;

        Ok(random_walk(rate, None, &FOREX_WALK))
    }
}
