//! Polygon.io aggregate bars adapter (stocks, highest priority).

use async_trait::async_trait;
use serde_json::Value;

use crate::market::candle::{Candle, Timeframe};
use crate::market::error::SourceError;
use crate::market::rest::RestClient;
use crate::market::source::{millis_to_datetime, num_field, DataSource};

pub struct Polygon {
    rest: RestClient,
}

impl Polygon {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl DataSource for Polygon {
    fn name(&self) -> &'static str {
        "Polygon.io"
    }

    async fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>, SourceError> {
        let (multiplier, timespan) = if timeframe.is_daily() {
            (1, "day")
        } else {
            (7, "week")
        };
        let url = format!(
            "https://api.polygon.io/v2/aggs/ticker/{symbol}/range/{multiplier}/{timespan}/1?limit=100&sort=asc"
        );

        let payload = self.rest.get_json(&url).await?;
        let rows = payload
            .get("results")
            .and_then(Value::as_array)
            .filter(|rows| !rows.is_empty())
            .ok_or_else(|| SourceError::NoData("no results from Polygon.io".to_string()))?;

        rows.iter()
            .map(|row| {
                Ok(Candle {
                    date: millis_to_datetime(num_field(row, "t")? as i64)?,
                    open: num_field(row, "o")?,
                    high: num_field(row, "h")?,
                    low: num_field(row, "l")?,
                    close: num_field(row, "c")?,
                    // Volume is sometimes absent on free-tier aggregates
                    volume: row.get("v").and_then(Value::as_f64).unwrap_or(0.0),
                })
            })
            .collect()
    }
}
