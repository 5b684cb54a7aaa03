//! The uniform data source capability.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::candle::{Candle, Timeframe};
use super::error::SourceError;

/// One named data provider: `(symbol, timeframe) -> candles or failure`.
///
/// Real-API adapters and synthetic-walk generators implement the same
/// contract, so the fallback chain treats them interchangeably. Sources are
/// stateless aside from an optionally configured credential.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Provider name used in logs and failure aggregation.
    fn name(&self) -> &'static str;

    async fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>, SourceError>;
}

/// Read a numeric JSON field, erroring when it is absent or non-numeric.
pub fn num_field(row: &Value, field: &'static str) -> Result<f64, SourceError> {
    row.get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| malformed(row, field))
}

/// Read a numeric field serialized as a string (Binance and Alpha Vantage
/// quote prices as strings on the wire).
pub fn str_num_field(row: &Value, field: &'static str) -> Result<f64, SourceError> {
    let raw = row
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(row, field))?;
    raw.parse().map_err(|_| SourceError::Malformed {
        field,
        value: raw.to_string(),
    })
}

/// Parse a numeric string already extracted from a payload.
pub fn parse_num(raw: &str, field: &'static str) -> Result<f64, SourceError> {
    raw.parse().map_err(|_| SourceError::Malformed {
        field,
        value: raw.to_string(),
    })
}

/// Convert a millisecond epoch timestamp into a UTC datetime.
pub fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, SourceError> {
    DateTime::from_timestamp_millis(ms).ok_or(SourceError::Malformed {
        field: "timestamp",
        value: ms.to_string(),
    })
}

fn malformed(row: &Value, field: &'static str) -> SourceError {
    SourceError::Malformed {
        field,
        value: row.get(field).map(Value::to_string).unwrap_or_else(|| "missing".to_string()),
    }
}
