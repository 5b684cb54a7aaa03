//! Base constants and utility functions for the chart module.

use egui::Color32;

// Chart colors (dark theme)
pub const BACKGROUND_COLOR: Color32 = Color32::from_rgb(0x13, 0x17, 0x22);
pub const GRID_COLOR: Color32 = Color32::from_rgb(0x1e, 0x22, 0x2d);
pub const BULL_COLOR: Color32 = Color32::from_rgb(0x26, 0xa6, 0x9a); // Teal for close >= open
pub const BEAR_COLOR: Color32 = Color32::from_rgb(0xf2, 0x36, 0x45); // Red for close < open
pub const ACCENT_COLOR: Color32 = Color32::from_rgb(0x29, 0x62, 0xff); // Hover/crosshair/drawings
pub const AXIS_TEXT_COLOR: Color32 = Color32::from_rgb(0x78, 0x7f, 0x8f);
pub const TOOLTIP_TEXT_COLOR: Color32 = Color32::from_rgb(0xd1, 0xd5, 0xdb);
pub const TOOLTIP_BG_COLOR: Color32 = Color32::from_rgba_premultiplied(19, 23, 34, 242);
pub const CROSSHAIR_COLOR: Color32 = Color32::from_rgba_premultiplied(41, 98, 255, 77);

// Geometry at zoom 1.0
pub const BASE_CANDLE_WIDTH: f32 = 8.0;
pub const BASE_SPACING: f32 = 12.0;

// Layout
pub const PRICE_AXIS_WIDTH: f32 = 60.0;
pub const TIME_AXIS_HEIGHT: f32 = 40.0;
pub const TOP_MARGIN: f32 = 8.0;
pub const HORIZONTAL_GRID_STEP: f32 = 40.0;

// Zoom
pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 3.0;
pub const ZOOM_IN_FACTOR: f32 = 1.1;
pub const ZOOM_OUT_FACTOR: f32 = 0.9;

// Axis labels
pub const PRICE_TICKS: usize = 5;
pub const DATE_TICKS: usize = 6;

// Tooltip
pub const TOOLTIP_WIDTH: f32 = 140.0;
pub const TOOLTIP_HEIGHT: f32 = 80.0;

// A doji body still gets one visible pixel
pub const MIN_BODY_HEIGHT: f32 = 1.0;

// Volume pane share of the plotting region when enabled
pub const VOLUME_HEIGHT_RATIO: f32 = 0.25;

/// Format price with fixed precision
pub fn format_price(price: f64, decimals: usize) -> String {
    format!("{:.prec$}", price, prec = decimals)
}

/// Format volume with appropriate units (K, M, B)
pub fn format_volume(volume: f64) -> String {
    if volume >= 1_000_000_000.0 {
        format!("{:.2}B", volume / 1_000_000_000.0)
    } else if volume >= 1_000_000.0 {
        format!("{:.2}M", volume / 1_000_000.0)
    } else if volume >= 1_000.0 {
        format!("{:.2}K", volume / 1_000.0)
    } else {
        format!("{:.2}", volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(259.8543, 2), "259.85");
        assert_eq!(format_price(1.08215, 4), "1.0822");
    }

    #[test]
    fn test_format_volume() {
        assert_eq!(format_volume(100.0), "100.00");
        assert_eq!(format_volume(1500.0), "1.50K");
        assert_eq!(format_volume(45_010_000.0), "45.01M");
        assert_eq!(format_volume(1_500_000_000.0), "1.50B");
    }
}
