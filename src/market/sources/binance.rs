//! Binance klines adapter (crypto, second priority).
//!
//! The only crypto source returning real historical OHLC. Symbols are
//! quoted against USDT, matching how the UI tickers are entered (`BTC`,
//! `ETH`, ...).

use async_trait::async_trait;
use serde_json::Value;

use crate::market::candle::{Candle, Timeframe};
use crate::market::error::SourceError;
use crate::market::rest::RestClient;
use crate::market::source::{millis_to_datetime, DataSource};

pub struct Binance {
    rest: RestClient,
}

impl Binance {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl DataSource for Binance {
    fn name(&self) -> &'static str {
        "Binance"
    }

    async fn fetch(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>, SourceError> {
        let pair = format!("{symbol}USDT");
        let interval = if timeframe.is_daily() { "1d" } else { "1w" };
        let url = format!(
            "https://api.binance.com/api/v3/klines?symbol={pair}&interval={interval}&limit=100"
        );

        let payload = self.rest.get_json(&url).await?;
        let rows = payload
            .as_array()
            .filter(|rows| !rows.is_empty())
            .ok_or_else(|| SourceError::NoData("no data from Binance".to_string()))?;

        rows.iter().map(parse_kline).collect()
    }
}

/// One kline row is a positional array:
/// `[open time ms, open, high, low, close, base volume, close time, quote volume, ...]`
/// with prices and volumes quoted as strings.
fn parse_kline(row: &Value) -> Result<Candle, SourceError> {
    let arr = row.as_array().ok_or(SourceError::Malformed {
        field: "kline",
        value: row.to_string(),
    })?;

    Ok(Candle {
        date: millis_to_datetime(index_i64(arr, 0)?)?,
        open: index_num(arr, 1, "open")?,
        high: index_num(arr, 2, "high")?,
        low: index_num(arr, 3, "low")?,
        close: index_num(arr, 4, "close")?,
        // Quote asset volume, so stock and crypto volumes read comparably
        volume: index_num(arr, 7, "volume")?,
    })
}

fn index_i64(arr: &[Value], ix: usize) -> Result<i64, SourceError> {
    arr.get(ix)
        .and_then(Value::as_i64)
        .ok_or(SourceError::Malformed {
            field: "timestamp",
            value: format!("kline[{ix}]"),
        })
}

fn index_num(arr: &[Value], ix: usize, field: &'static str) -> Result<f64, SourceError> {
    let raw = arr
        .get(ix)
        .and_then(Value::as_str)
        .ok_or(SourceError::Malformed {
            field,
            value: format!("kline[{ix}]"),
        })?;
    raw.parse().map_err(|_| SourceError::Malformed {
        field,
        value: raw.to_string(),
    })
}
