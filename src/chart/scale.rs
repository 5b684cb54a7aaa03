//! Pure pixel mapping between candle indices / prices and screen space.
//!
//! All coordinate math lives here so it can be exercised without a draw
//! surface: the widget only feeds the resulting positions to the painter.

use egui::{pos2, Pos2, Rect};

use super::base::{
    BASE_CANDLE_WIDTH, BASE_SPACING, PRICE_AXIS_WIDTH, TIME_AXIS_HEIGHT, TOP_MARGIN,
};

/// Horizontal distance between candle slots at the given zoom.
pub fn spacing(zoom: f32) -> f32 {
    BASE_SPACING * zoom
}

/// Candle body width at the given zoom.
pub fn candle_width(zoom: f32) -> f32 {
    BASE_CANDLE_WIDTH * zoom
}

/// Plotting region inside the widget rect, excluding the axis gutters.
pub fn plot_rect(outer: Rect) -> Rect {
    Rect::from_min_max(
        pos2(outer.left() + PRICE_AXIS_WIDTH, outer.top() + TOP_MARGIN),
        pos2(outer.right(), outer.bottom() - TIME_AXIS_HEIGHT),
    )
}

/// How many trailing candles fit the plot width at the given zoom.
pub fn visible_capacity(plot_width: f32, zoom: f32) -> usize {
    ((plot_width / spacing(zoom)).floor() as usize).max(1)
}

/// Upper bound for the scroll offset in pixels: scrolling further back than
/// the oldest candle is pointless.
pub fn max_scroll(total: usize, capacity: usize, zoom: f32) -> f32 {
    total.saturating_sub(capacity) as f32 * spacing(zoom)
}

/// Inclusive `(first, last)` candle window for the current scroll position.
/// `None` when there is nothing to show.
pub fn visible_window(
    total: usize,
    capacity: usize,
    scroll_px: f32,
    zoom: f32,
) -> Option<(usize, usize)> {
    if total == 0 {
        return None;
    }
    let shift = (scroll_px.max(0.0) / spacing(zoom)).round() as usize;
    let last = (total - 1).saturating_sub(shift.min(total - 1));
    let first = (last + 1).saturating_sub(capacity);
    Some((first, last))
}

/// Frozen mapping for one frame: plot rect, zoom, visible window and the
/// price range spanned by that window.
#[derive(Debug, Clone, Copy)]
pub struct ChartScale {
    pub plot: Rect,
    pub zoom: f32,
    pub first_ix: usize,
    pub last_ix: usize,
    pub price_min: f64,
    pub price_max: f64,
}

impl ChartScale {
    /// Center x of the slot for candle `ix`.
    pub fn index_to_x(&self, ix: usize) -> f32 {
        let spacing = spacing(self.zoom);
        self.plot.left() + (ix - self.first_ix) as f32 * spacing + spacing * 0.5
    }

    /// Inverse of `index_to_x`: resolve a pointer position to a candle
    /// index. Positions outside the plotting region (including left of the
    /// price axis gutter) resolve to `None` rather than clamping to an edge
    /// candle.
    pub fn x_to_index(&self, pos: Pos2) -> Option<usize> {
        if !self.plot.contains(pos) {
            return None;
        }
        let slot = ((pos.x - self.plot.left()) / spacing(self.zoom)).floor();
        if slot < 0.0 {
            return None;
        }
        let ix = self.first_ix + slot as usize;
        (ix <= self.last_ix).then_some(ix)
    }

    /// Map a price to a y coordinate: higher price, smaller y. Degenerate
    /// ranges collapse to the vertical center instead of dividing by zero.
    pub fn price_to_y(&self, price: f64) -> f32 {
        let range = self.price_max - self.price_min;
        if range <= 0.0 {
            return self.plot.center().y;
        }
        let normalized = (self.price_max - price) / range;
        self.plot.top() + normalized as f32 * self.plot.height()
    }

    /// Inverse of `price_to_y`, used to place price-level annotations.
    pub fn y_to_price(&self, y: f32) -> f64 {
        let range = self.price_max - self.price_min;
        if range <= 0.0 {
            return self.price_min;
        }
        let normalized = ((y - self.plot.top()) / self.plot.height()) as f64;
        self.price_max - normalized * range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_scale(zoom: f32) -> ChartScale {
        ChartScale {
            plot: Rect::from_min_max(pos2(60.0, 8.0), pos2(860.0, 560.0)),
            zoom,
            first_ix: 40,
            last_ix: 100,
            price_min: 95.0,
            price_max: 110.0,
        }
    }

    #[test]
    fn test_hover_is_exact_inverse_of_index_to_x() {
        for zoom in [0.5, 1.0, 1.7, 3.0] {
            let scale = test_scale(zoom);
            for ix in scale.first_ix..=scale.last_ix {
                let x = scale.index_to_x(ix);
                if x >= scale.plot.right() {
                    break;
                }
                let resolved = scale.x_to_index(pos2(x, scale.plot.center().y));
                assert_eq!(resolved, Some(ix), "zoom {zoom}, ix {ix}");
            }
        }
    }

    #[test]
    fn test_out_of_bounds_clears_hover() {
        let scale = test_scale(1.0);
        // Left of the price axis gutter
        assert_eq!(scale.x_to_index(pos2(30.0, 100.0)), None);
        // Above and below the plotting region
        assert_eq!(scale.x_to_index(pos2(200.0, 2.0)), None);
        assert_eq!(scale.x_to_index(pos2(200.0, 590.0)), None);
        // Beyond the last candle
        let far_right = scale.index_to_x(scale.last_ix) + spacing(scale.zoom) * 2.0;
        if far_right < scale.plot.right() {
            assert_eq!(scale.x_to_index(pos2(far_right, 100.0)), None);
        }
    }

    #[test]
    fn test_price_mapping_is_inverted_linear() {
        let scale = test_scale(1.0);
        assert_eq!(scale.price_to_y(110.0), scale.plot.top());
        assert_eq!(scale.price_to_y(95.0), scale.plot.bottom());
        let mid = scale.price_to_y(102.5);
        assert!((mid - scale.plot.center().y).abs() < 0.5);

        // Round trip
        let price = scale.y_to_price(scale.price_to_y(101.25));
        assert!((price - 101.25).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_range_stays_finite() {
        let mut scale = test_scale(1.0);
        scale.price_min = 100.0;
        scale.price_max = 100.0;
        let y = scale.price_to_y(100.0);
        assert!(y.is_finite());
        assert_eq!(y, scale.plot.center().y);
        assert!(scale.y_to_price(y).is_finite());
    }

    #[test]
    fn test_visible_window_trailing() {
        // 200 candles, room for 50: show the newest 50
        assert_eq!(visible_window(200, 50, 0.0, 1.0), Some((150, 199)));
        // Scrolled back by 10 slots
        let scroll = 10.0 * spacing(1.0);
        assert_eq!(visible_window(200, 50, scroll, 1.0), Some((140, 189)));
        // Fewer candles than capacity
        assert_eq!(visible_window(20, 50, 0.0, 1.0), Some((0, 19)));
        // Nothing at all
        assert_eq!(visible_window(0, 50, 0.0, 1.0), None);
    }

    #[test]
    fn test_visible_window_never_scrolls_past_oldest() {
        let scroll = 10_000.0 * spacing(1.0);
        let (first, last) = visible_window(200, 50, scroll, 1.0).unwrap();
        assert_eq!((first, last), (0, 0));
    }

    #[test]
    fn test_capacity_scales_with_zoom() {
        let wide = visible_capacity(800.0, 0.5);
        let base = visible_capacity(800.0, 1.0);
        let narrow = visible_capacity(800.0, 3.0);
        assert!(wide > base && base > narrow);
        // Degenerate width still reports one slot
        assert_eq!(visible_capacity(1.0, 3.0), 1);
    }
}
