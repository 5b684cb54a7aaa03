//! Twelve Data time series adapter (forex, last priority, needs a key).

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::market::candle::{Candle, Timeframe};
use crate::market::error::SourceError;
use crate::market::rest::RestClient;
use crate::market::source::{str_num_field, DataSource};

pub struct TwelveData {
    rest: RestClient,
    api_key: Option<String>,
}

impl TwelveData {
    pub fn new(rest: RestClient, api_key: Option<String>) -> Self {
        Self { rest, api_key }
    }
}

#[async_trait]
impl DataSource for TwelveData {
    fn name(&self) -> &'static str {
        "Twelve Data"
    }

    async fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>, SourceError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SourceError::MissingCredential("Twelve Data"))?;

        let interval = if timeframe.is_daily() { "1day" } else { "1week" };
        let url = RestClient::url_with_params(
            "https://api.twelvedata.com/time_series",
            [
                ("symbol", symbol),
                ("interval", interval),
                ("outputsize", "100"),
                ("apikey", api_key),
            ],
        )?;

        let payload = self.rest.get_json(&url).await?;
        let rows = payload
            .get("values")
            .and_then(Value::as_array)
            .filter(|rows| !rows.is_empty())
            .ok_or_else(|| SourceError::NoData("no data from Twelve Data".to_string()))?;

        // Rows arrive newest-first; the chain re-sorts chronologically.
        rows.iter()
            .map(|row| {
                Ok(Candle {
                    date: parse_datetime(row)?,
                    open: str_num_field(row, "open")?,
                    high: str_num_field(row, "high")?,
                    low: str_num_field(row, "low")?,
                    close: str_num_field(row, "close")?,
                    // Forex rows frequently omit volume
                    volume: str_num_field(row, "volume").unwrap_or(0.0),
                })
            })
            .collect()
    }
}

/// `datetime` is either `YYYY-MM-DD HH:MM:SS` (intraday) or `YYYY-MM-DD`.
fn parse_datetime(row: &Value) -> Result<DateTime<Utc>, SourceError> {
    let raw = row
        .get("datetime")
        .and_then(Value::as_str)
        .ok_or(SourceError::Malformed {
            field: "datetime",
            value: "missing".to_string(),
        })?;

    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| date.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc())
        .map_err(|_| SourceError::Malformed {
            field: "datetime",
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_datetime_both_formats() {
        let daily = json!({ "datetime": "2024-06-03" });
        assert_eq!(
            parse_datetime(&daily).unwrap().to_rfc3339(),
            "2024-06-03T00:00:00+00:00"
        );

        let intraday = json!({ "datetime": "2024-06-03 14:30:00" });
        assert_eq!(
            parse_datetime(&intraday).unwrap().to_rfc3339(),
            "2024-06-03T14:30:00+00:00"
        );

        let bad = json!({ "datetime": "yesterday" });
        assert!(parse_datetime(&bad).is_err());
    }
}
