//! Yahoo Finance quote adapter (stocks, second priority).
//!
//! The free quote endpoint only exposes the current market price, so this
//! adapter synthesizes a walk series from it rather than returning real
//! history.

use async_trait::async_trait;
use serde_json::Value;

use crate::market::candle::{Candle, Timeframe};
use crate::market::error::SourceError;
use crate::market::rest::RestClient;
use crate::market::source::DataSource;
use crate::market::synthetic::{random_walk, STOCK_WALK};

pub struct Yahoo {
    rest: RestClient,
}

impl Yahoo {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl DataSource for Yahoo {
    fn name(&self) -> &'static str {
        "Yahoo Finance"
    }

    async fn fetch(&self, symbol: &str, _timeframe: Timeframe) -> Result<Vec<Candle>, SourceError> {
        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{symbol}?modules=price"
        );

        let payload = self.rest.get_json(&url).await?;
        let price = payload
            .pointer("/quoteSummary/result/0/price/regularMarketPrice")
            .and_then(Value::as_f64)
            .ok_or_else(|| SourceError::NoData("no data from Yahoo Finance".to_string()))?;

        Ok(random_walk(price, None, &STOCK_WALK))
    }
}
