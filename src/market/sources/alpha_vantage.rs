//! Alpha Vantage time series adapter (stocks, last priority, needs a key).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::market::candle::{Candle, Timeframe};
use crate::market::error::SourceError;
use crate::market::rest::RestClient;
use crate::market::source::{parse_num, DataSource};

/// Most recent entries kept from the returned series.
const MAX_ENTRIES: usize = 100;

pub struct AlphaVantage {
    rest: RestClient,
    api_key: Option<String>,
}

impl AlphaVantage {
    pub fn new(rest: RestClient, api_key: Option<String>) -> Self {
        Self { rest, api_key }
    }
}

#[async_trait]
impl DataSource for AlphaVantage {
    fn name(&self) -> &'static str {
        "Alpha Vantage"
    }

    async fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::MissingCredential("Alpha Vantage"))?;

        let interval = if timeframe.is_daily() { "daily" } else { "weekly" };
        let url = RestClient::url_with_params(
            "https://www.alphavantage.co/query",
            [
                ("function", format!("TIME_SERIES_{}", interval.to_uppercase()).as_str()),
                ("symbol", symbol),
                ("apikey", api_key),
            ],
        )?;

        let payload = self.rest.get_json(&url).await?;

        // The API reports quota exhaustion with a 200 status and a "Note"
        // (or "Error Message") field in the body.
        if payload.get("Error Message").is_some() || payload.get("Note").is_some() {
            return Err(SourceError::RateLimited(
                "Alpha Vantage API limit or error".to_string(),
            ));
        }

        let series = payload
            .get(format!("Time Series ({interval})"))
            .and_then(Value::as_object)
            .ok_or_else(|| SourceError::NoData("no data returned".to_string()))?;

        let mut candles = series
            .iter()
            .map(|(date, values)| {
                Ok(Candle {
                    date: parse_series_date(date)?,
                    open: field(values, "1. open")?,
                    high: field(values, "2. high")?,
                    low: field(values, "3. low")?,
                    close: field(values, "4. close")?,
                    volume: field(values, "5. volume").unwrap_or(0.0),
                })
            })
            .collect::<Result<Vec<_>, SourceError>>()?;

        // Keep the most recent entries; the chain re-sorts chronologically.
        candles.sort_by(|a, b| b.date.cmp(&a.date));
        candles.truncate(MAX_ENTRIES);
        Ok(candles)
    }
}

fn field(values: &Value, key: &'static str) -> Result<f64, SourceError> {
    let raw = values
        .get(key)
        .and_then(Value::as_str)
        .ok_or(SourceError::Malformed {
            field: key,
            value: "missing".to_string(),
        })?;
    parse_num(raw, key)
}

fn parse_series_date(raw: &str) -> Result<DateTime<Utc>, SourceError> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| SourceError::Malformed {
        field: "date",
        value: raw.to_string(),
    })?;
    Ok(date
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_series_date() {
        let dt = parse_series_date("2024-06-03").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-06-03T00:00:00+00:00");
        assert!(parse_series_date("June 3rd").is_err());
    }

    #[test]
    fn test_field_requires_numeric_string() {
        let values = serde_json::json!({ "1. open": "182.50", "4. close": "oops" });
        assert_eq!(field(&values, "1. open").unwrap(), 182.5);
        assert!(field(&values, "4. close").is_err());
        assert!(field(&values, "2. high").is_err());
    }
}
