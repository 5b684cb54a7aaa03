//! Candle store for the chart module.
//!
//! Holds the active symbol's candle sequence in chronological order and
//! answers range queries over an index window. The store is replaced
//! wholesale on every symbol or timeframe change; nothing is persisted.

use crate::market::Candle;

#[derive(Default)]
pub struct CandleManager {
    /// Chronologically ordered candles, oldest first.
    candles: Vec<Candle>,
}

impl CandleManager {
    pub fn new() -> Self {
        Self { candles: Vec::new() }
    }

    /// Replace the whole series. Input order does not matter; the store
    /// re-sorts to keep the chronological invariant locally.
    pub fn set_history(&mut self, mut candles: Vec<Candle>) {
        candles.sort_by(|a, b| a.date.cmp(&b.date));
        self.candles = candles;
    }

    pub fn clear(&mut self) {
        self.candles.clear();
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn get(&self, ix: usize) -> Option<&Candle> {
        self.candles.get(ix)
    }

    pub fn all(&self) -> &[Candle] {
        &self.candles
    }

    /// Price range `[min(low), max(high)]` over an inclusive index window.
    /// Returns `(0.0, 1.0)` for an empty or inverted window so callers never
    /// divide by a bogus range.
    pub fn price_range(&self, min_ix: usize, max_ix: usize) -> (f64, f64) {
        let window = self.window(min_ix, max_ix);
        if window.is_empty() {
            return (0.0, 1.0);
        }

        let mut min_price = window[0].low;
        let mut max_price = window[0].high;
        for candle in window.iter().skip(1) {
            min_price = min_price.min(candle.low);
            max_price = max_price.max(candle.high);
        }
        (min_price, max_price)
    }

    /// Largest volume over an inclusive index window, zero when empty.
    pub fn max_volume(&self, min_ix: usize, max_ix: usize) -> f64 {
        self.window(min_ix, max_ix)
            .iter()
            .fold(0.0, |acc, candle| acc.max(candle.volume))
    }

    fn window(&self, min_ix: usize, max_ix: usize) -> &[Candle] {
        if self.candles.is_empty() || min_ix > max_ix {
            return &[];
        }
        let max_ix = max_ix.min(self.candles.len() - 1);
        if min_ix > max_ix {
            return &[];
        }
        &self.candles[min_ix..=max_ix]
    }
}
