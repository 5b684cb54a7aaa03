//! Synthetic candle generation.
//!
//! Several free providers only expose a current spot price or exchange rate,
//! not historical OHLC. Adapters for those providers synthesize a bounded
//! random-walk series backward from "now" so the chart always has a full
//! window to render. This is explicitly a last-resort approximation, not
//! real history.

use chrono::{Duration, Utc};
use rand::Rng;

use super::candle::Candle;

/// Number of candles generated per synthetic series.
pub const SYNTHETIC_COUNT: usize = 100;

/// Bounded percentages driving a random walk. Each asset class gets its own
/// profile so synthetic stock candles wiggle like stocks and synthetic forex
/// candles stay tight like forex.
#[derive(Debug, Clone, Copy)]
pub struct WalkProfile {
    /// Max fractional step of the running price per candle.
    pub step: f64,
    /// Max fractional open-to-close move within one candle.
    pub body: f64,
    /// Max fractional wick extension beyond the body.
    pub wick: f64,
    /// Volume noise ceiling used when the provider exposes no volume figure.
    pub noise_volume: f64,
}

pub const STOCK_WALK: WalkProfile = WalkProfile {
    step: 0.02,
    body: 0.01,
    wick: 0.01,
    noise_volume: 100_000_000.0,
};

pub const CRYPTO_WALK: WalkProfile = WalkProfile {
    step: 0.05,
    body: 0.02,
    wick: 0.02,
    noise_volume: 100_000_000.0,
};

pub const FOREX_WALK: WalkProfile = WalkProfile {
    step: 0.001,
    body: 0.0005,
    wick: 0.0005,
    noise_volume: 1_000_000_000.0,
};

/// Generate a random-walk series ending at "now", one candle per day.
///
/// `volume_hint` is the provider's aggregate volume figure (e.g. a 24h
/// volume); when absent, volume is pure noise below the profile ceiling.
/// High and low are derived from the body extremes, so the candle invariant
/// `low <= min(open, close) <= max(open, close) <= high` holds by
/// construction.
pub fn random_walk(spot: f64, volume_hint: Option<f64>, profile: &WalkProfile) -> Vec<Candle> {
    let mut rng = rand::rng();
    let now = Utc::now();
    let mut price = spot;
    let mut candles = Vec::with_capacity(SYNTHETIC_COUNT);

    for age in (1..=SYNTHETIC_COUNT as i64).rev() {
        price *= 1.0 + (rng.random::<f64>() - 0.5) * profile.step;
        let open = price;
        let close = price * (1.0 + (rng.random::<f64>() - 0.5) * profile.body);
        let high = open.max(close) * (1.0 + rng.random::<f64>() * profile.wick);
        let low = open.min(close) * (1.0 - rng.random::<f64>() * profile.wick);

        let volume = match volume_hint {
            Some(aggregate) => (aggregate / 100.0 + rng.random::<f64>() * aggregate / 50.0).floor(),
            None => (rng.random::<f64>() * profile.noise_volume).floor(),
        };

        candles.push(Candle {
            date: now - Duration::days(age),
            open,
            high,
            low,
            close,
            volume,
        });
    }

    candles
}

/// Pure mock series used when the whole fallback chain is unreachable
/// (e.g. total network unavailability). Starts from an arbitrary price and
/// walks forward with a 100-point floor.
pub fn mock_series(count: usize) -> Vec<Candle> {
    let mut rng = rand::rng();
    let now = Utc::now();
    let mut price = 200.0;
    let mut candles = Vec::with_capacity(count);

    for ix in 0..count {
        let open = price;
        let change = (rng.random::<f64>() - 0.5) * 10.0;
        let close = (open + change).max(100.0);
        let high = open.max(close) + rng.random::<f64>() * 5.0;
        let low = open.min(close) - rng.random::<f64>() * 5.0;
        let volume = (rng.random::<f64>() * 100_000_000.0).floor();

        candles.push(Candle {
            date: now - Duration::days((count - ix) as i64),
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
    }

    candles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invariant(candles: &[Candle]) {
        for candle in candles {
            assert!(candle.low <= candle.open.min(candle.close), "{candle:?}");
            assert!(candle.high >= candle.open.max(candle.close), "{candle:?}");
            assert!(candle.volume >= 0.0, "{candle:?}");
            assert!(candle.is_finite(), "{candle:?}");
        }
    }

    #[test]
    fn test_random_walk_invariant_holds() {
        // 10 series x 100 candles = 1000 random generations
        for _ in 0..10 {
            let candles = random_walk(250.0, Some(1_000_000.0), &STOCK_WALK);
            assert_eq!(candles.len(), SYNTHETIC_COUNT);
            assert_invariant(&candles);
        }
    }

    #[test]
    fn test_random_walk_is_chronological() {
        let candles = random_walk(1.08, None, &FOREX_WALK);
        for pair in candles.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }

    #[test]
    fn test_mock_series_invariant_and_floor() {
        let candles = mock_series(SYNTHETIC_COUNT);
        assert_eq!(candles.len(), SYNTHETIC_COUNT);
        assert_invariant(&candles);
        for candle in &candles {
            assert!(candle.close >= 100.0);
        }
    }

    #[test]
    fn test_volume_hint_bounds() {
        let candles = random_walk(50_000.0, Some(10_000.0), &CRYPTO_WALK);
        for candle in &candles {
            assert!(candle.volume >= 100.0);
            assert!(candle.volume <= 10_000.0 / 100.0 + 10_000.0 / 50.0);
        }
    }
}
