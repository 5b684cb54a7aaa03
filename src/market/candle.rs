//! Core market data objects: candles, asset types and timeframes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV observation.
///
/// Real-source candles satisfy `low <= min(open, close)` and
/// `max(open, close) <= high`; synthetic candles are generated so the
/// same bounds hold by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket timestamp, serialized as an ISO-8601 string.
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Non-negative; units vary by asset class (shares vs. base-currency units).
    pub volume: f64,
}

impl Candle {
    /// Whether the candle is bullish (`close >= open`).
    pub fn is_bullish(&self) -> bool {
        self.close >= self.open
    }

    /// All numeric fields are finite, so the candle is safe to map to
    /// pixel coordinates.
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }
}

/// Asset class derived from the symbol string, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
    Stock,
    Crypto,
    Forex,
}

impl AssetType {
    /// Wire name used in the HTTP response and the UI badge.
    pub fn wire_name(&self) -> &'static str {
        match self {
            AssetType::Stock => "STOCK",
            AssetType::Crypto => "CRYPTO",
            AssetType::Forex => "FOREX",
        }
    }
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Aggregation window for returned candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    /// 1 day
    D1,
    /// 5 days
    D5,
    /// 1 month
    M1,
    /// 3 months
    M3,
    /// 6 months
    M6,
    /// 1 year
    Y1,
    /// 5 years
    Y5,
}

impl Timeframe {
    /// All timeframes in display order.
    pub fn all() -> [Timeframe; 7] {
        [
            Timeframe::D1,
            Timeframe::D5,
            Timeframe::M1,
            Timeframe::M3,
            Timeframe::M6,
            Timeframe::Y1,
            Timeframe::Y5,
        ]
    }

    /// Wire name as used in query strings and the UI selector.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Timeframe::D1 => "1D",
            Timeframe::D5 => "5D",
            Timeframe::M1 => "1M",
            Timeframe::M3 => "3M",
            Timeframe::M6 => "6M",
            Timeframe::Y1 => "1Y",
            Timeframe::Y5 => "5Y",
        }
    }

    /// Parse a wire name, e.g. `"1D"`.
    pub fn parse(s: &str) -> Option<Timeframe> {
        Timeframe::all().into_iter().find(|tf| tf.wire_name() == s)
    }

    /// Providers only distinguish daily vs. weekly granularity: `1D` maps
    /// to daily candles, every longer window to weekly ones.
    pub fn is_daily(&self) -> bool {
        matches!(self, Timeframe::D1)
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_wire_names_round_trip() {
        for tf in Timeframe::all() {
            assert_eq!(Timeframe::parse(tf.wire_name()), Some(tf));
        }
        assert_eq!(Timeframe::parse("2H"), None);
    }

    #[test]
    fn test_timeframe_granularity() {
        assert!(Timeframe::D1.is_daily());
        assert!(!Timeframe::D5.is_daily());
        assert!(!Timeframe::Y5.is_daily());
    }

    #[test]
    fn test_candle_direction() {
        let mut candle = Candle {
            date: Utc::now(),
            open: 100.0,
            high: 105.0,
            low: 95.0,
            close: 102.0,
            volume: 1000.0,
        };
        assert!(candle.is_bullish());

        candle.close = 98.0;
        assert!(!candle.is_bullish());

        // Doji counts as bullish
        candle.close = candle.open;
        assert!(candle.is_bullish());
    }

    #[test]
    fn test_candle_serializes_date_as_iso() {
        let candle = Candle {
            date: DateTime::parse_from_rfc3339("2024-06-01T00:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
        };
        let json = serde_json::to_value(&candle).unwrap();
        assert_eq!(json["date"], "2024-06-01T00:00:00Z");
        assert_eq!(json["close"], 1.5);
    }

    #[test]
    fn test_candle_finite_check() {
        let mut candle = Candle {
            date: Utc::now(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
        };
        assert!(candle.is_finite());
        candle.high = f64::NAN;
        assert!(!candle.is_finite());
    }
}
