//! Chart widget with hover, zoom, pan and freehand drawing support.
//!
//! The draw pass is a pure function of the candle store and the view state;
//! it runs on every frame and maps domain values to pixels through
//! `ChartScale`. Empty data short-circuits to a background-only frame so no
//! coordinate math ever runs against a zero price range.

use egui::{pos2, Align2, FontId, Pos2, Rect, Response, Sense, Shape, Stroke, StrokeKind, Ui};

use crate::market::Candle;

use super::base::{
    format_price, format_volume, ACCENT_COLOR, AXIS_TEXT_COLOR, BACKGROUND_COLOR, BEAR_COLOR,
    BULL_COLOR, CROSSHAIR_COLOR, DATE_TICKS, GRID_COLOR, HORIZONTAL_GRID_STEP, MIN_BODY_HEIGHT,
    PRICE_TICKS, TOOLTIP_BG_COLOR, TOOLTIP_HEIGHT, TOOLTIP_TEXT_COLOR, TOOLTIP_WIDTH,
    VOLUME_HEIGHT_RATIO,
};
use super::manager::CandleManager;
use super::scale::{
    candle_width, max_scroll, plot_rect, spacing, visible_capacity, visible_window, ChartScale,
};
use super::view::{HoverTarget, Tool, ViewState};

pub struct ChartWidget {
    pub manager: CandleManager,
    pub view: ViewState,
    price_decimals: usize,
}

impl ChartWidget {
    pub fn new() -> Self {
        Self {
            manager: CandleManager::new(),
            view: ViewState::new(),
            price_decimals: 2,
        }
    }

    pub fn set_price_decimals(&mut self, decimals: usize) {
        self.price_decimals = decimals;
    }

    /// Replace the candle series and jump the viewport to the newest window.
    pub fn update_history(&mut self, candles: Vec<Candle>) {
        self.manager.set_history(candles);
        self.view.reset_viewport();
    }

    /// Show the chart, handling input and redrawing from current state.
    pub fn show(&mut self, ui: &mut Ui) -> Response {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let plot = plot_rect(rect);

        self.handle_wheel(ui, &response);
        self.handle_drag(&response);

        let capacity = visible_capacity(plot.width(), self.view.zoom);
        let scroll_max = max_scroll(self.manager.len(), capacity, self.view.zoom);
        self.handle_keyboard(ui, scroll_max);
        self.view.clamp_scroll(scroll_max);

        painter.rect_filled(rect, 0.0, BACKGROUND_COLOR);
        self.draw_grid(&painter, plot);

        let window = visible_window(
            self.manager.len(),
            capacity,
            self.view.scroll_offset,
            self.view.zoom,
        );
        let Some((first_ix, last_ix)) = window else {
            // No data yet: grid and background only
            self.view.hover = None;
            return response;
        };

        let (price_pane, volume_pane) = split_panes(plot, self.view.show_volume);
        let (price_min, price_max) = self.manager.price_range(first_ix, last_ix);
        let scale = ChartScale {
            plot: price_pane,
            zoom: self.view.zoom,
            first_ix,
            last_ix,
            price_min,
            price_max,
        };

        self.resolve_hover(&response, &scale);
        self.handle_annotation_click(&response, &scale);

        self.draw_candles(&painter, &scale);
        if let Some(pane) = volume_pane {
            self.draw_volume(&painter, pane, first_ix, last_ix, &scale);
        }
        self.draw_annotations(&painter, &scale);
        self.draw_freehand(&painter);
        self.draw_axes(&painter, rect, &scale);
        self.draw_crosshair(&painter, rect, plot, &scale);

        response
    }

    fn handle_wheel(&mut self, ui: &Ui, response: &Response) {
        if !response.hovered() {
            return;
        }
        let delta = ui.input(|i| i.raw_scroll_delta);
        self.view.apply_wheel(delta.y);
    }

    fn handle_drag(&mut self, response: &Response) {
        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.view.begin_gesture(pos);
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.view.drag_to(pos, response.drag_delta().x);
            }
        }
        if response.drag_stopped() {
            self.view.end_gesture();
        }
        // Pointer left the widget entirely
        if response.hover_pos().is_none() && !response.dragged() {
            self.view.end_gesture();
        }
    }

    fn handle_keyboard(&mut self, ui: &Ui, scroll_max: f32) {
        let step = spacing(self.view.zoom);
        ui.input(|i| {
            if i.key_pressed(egui::Key::ArrowLeft) {
                self.view.scroll_offset += step;
            }
            if i.key_pressed(egui::Key::ArrowRight) {
                self.view.scroll_offset -= step;
            }
            if i.key_pressed(egui::Key::Home) {
                self.view.scroll_offset = scroll_max;
            }
            if i.key_pressed(egui::Key::End) {
                self.view.scroll_offset = 0.0;
            }
        });
    }

    fn resolve_hover(&mut self, response: &Response, scale: &ChartScale) {
        self.view.hover = response
            .hover_pos()
            .and_then(|pos| {
                scale
                    .x_to_index(pos)
                    .map(|candle_ix| HoverTarget { candle_ix, pos })
            });
    }

    /// Right-click inside the price pane drops a horizontal price-level
    /// annotation at the clicked price.
    fn handle_annotation_click(&mut self, response: &Response, scale: &ChartScale) {
        if !response.secondary_clicked() {
            return;
        }
        if let Some(pos) = response.interact_pointer_pos() {
            if scale.plot.contains(pos) {
                self.view.annotations.push(scale.y_to_price(pos.y));
            }
        }
    }

    fn draw_grid(&self, painter: &egui::Painter, plot: Rect) {
        let stroke = Stroke::new(1.0, GRID_COLOR);

        let step = spacing(self.view.zoom);
        let mut x = plot.left();
        while x < plot.right() {
            painter.line_segment([pos2(x, plot.top()), pos2(x, plot.bottom())], stroke);
            x += step;
        }

        let mut y = plot.top();
        while y < plot.bottom() {
            painter.line_segment([pos2(plot.left(), y), pos2(plot.right(), y)], stroke);
            y += HORIZONTAL_GRID_STEP;
        }
    }

    fn draw_candles(&self, painter: &egui::Painter, scale: &ChartScale) {
        let half_width = candle_width(self.view.zoom) * 0.5;

        for ix in scale.first_ix..=scale.last_ix {
            let Some(candle) = self.manager.get(ix) else { continue };

            let x = scale.index_to_x(ix);
            let color = if candle.is_bullish() { BULL_COLOR } else { BEAR_COLOR };
            let stroke = Stroke::new(1.0, color);

            // Wick
            let high_y = scale.price_to_y(candle.high);
            let low_y = scale.price_to_y(candle.low);
            painter.line_segment([pos2(x, high_y), pos2(x, low_y)], stroke);

            // Body, with a 1px floor so dojis stay visible
            let open_y = scale.price_to_y(candle.open);
            let close_y = scale.price_to_y(candle.close);
            let body_top = open_y.min(close_y);
            let body_height = (open_y - close_y).abs().max(MIN_BODY_HEIGHT);
            let body = Rect::from_min_size(
                pos2(x - half_width, body_top),
                egui::vec2(half_width * 2.0, body_height),
            );
            painter.rect_filled(body, 0.0, color);

            if self.view.hover.map(|h| h.candle_ix) == Some(ix) {
                painter.rect_stroke(
                    body.expand(2.0),
                    0.0,
                    Stroke::new(2.0, ACCENT_COLOR),
                    StrokeKind::Outside,
                );
            }
        }
    }

    fn draw_volume(
        &self,
        painter: &egui::Painter,
        pane: Rect,
        first_ix: usize,
        last_ix: usize,
        scale: &ChartScale,
    ) {
        let max_volume = self.manager.max_volume(first_ix, last_ix);
        if max_volume <= 0.0 {
            return;
        }

        let half_width = candle_width(self.view.zoom) * 0.5;
        for ix in first_ix..=last_ix {
            let Some(candle) = self.manager.get(ix) else { continue };

            let x = scale.index_to_x(ix);
            let color = if candle.is_bullish() { BULL_COLOR } else { BEAR_COLOR };
            let height = (candle.volume / max_volume) as f32 * pane.height();
            let bar = Rect::from_min_max(
                pos2(x - half_width, pane.bottom() - height),
                pos2(x + half_width, pane.bottom()),
            );
            painter.rect_filled(bar, 0.0, color.gamma_multiply(0.6));
        }
    }

    fn draw_annotations(&self, painter: &egui::Painter, scale: &ChartScale) {
        for price in &self.view.annotations {
            let y = scale.price_to_y(*price);
            if y < scale.plot.top() || y > scale.plot.bottom() {
                continue;
            }
            painter.extend(Shape::dashed_line(
                &[pos2(scale.plot.left(), y), pos2(scale.plot.right(), y)],
                Stroke::new(1.0, ACCENT_COLOR),
                6.0,
                4.0,
            ));
            painter.text(
                pos2(scale.plot.left() + 4.0, y - 2.0),
                Align2::LEFT_BOTTOM,
                format_price(*price, self.price_decimals),
                FontId::proportional(10.0),
                ACCENT_COLOR,
            );
        }
    }

    fn draw_freehand(&self, painter: &egui::Painter) {
        if self.view.drawing.len() < 2 || self.view.tool == Tool::Pointer {
            return;
        }
        painter.add(Shape::line(
            self.view.drawing.clone(),
            Stroke::new(2.0, ACCENT_COLOR),
        ));
    }

    fn draw_axes(&self, painter: &egui::Painter, rect: Rect, scale: &ChartScale) {
        // Price ticks at fixed fractional steps of the visible range
        let range = scale.price_max - scale.price_min;
        for tick in 0..=PRICE_TICKS {
            let price = scale.price_min + range / PRICE_TICKS as f64 * tick as f64;
            let y = scale.plot.bottom()
                - scale.plot.height() / PRICE_TICKS as f32 * tick as f32;
            painter.text(
                pos2(scale.plot.left() - 10.0, y),
                Align2::RIGHT_CENTER,
                format_price(price, self.price_decimals),
                FontId::proportional(12.0),
                AXIS_TEXT_COLOR,
            );
        }

        // Date ticks at fixed fractional steps across the visible window
        let window_len = scale.last_ix - scale.first_ix + 1;
        for tick in 0..DATE_TICKS {
            let ix = scale.first_ix + window_len * tick / DATE_TICKS;
            let Some(candle) = self.manager.get(ix) else { continue };
            let x = scale.index_to_x(ix);
            if x > scale.plot.right() {
                continue;
            }
            painter.text(
                pos2(x, rect.bottom() - 10.0),
                Align2::CENTER_CENTER,
                candle.date.format("%b %d").to_string(),
                FontId::proportional(12.0),
                AXIS_TEXT_COLOR,
            );
        }
    }

    fn draw_crosshair(
        &self,
        painter: &egui::Painter,
        rect: Rect,
        plot: Rect,
        scale: &ChartScale,
    ) {
        let Some(hover) = self.view.hover else { return };
        let Some(candle) = self.manager.get(hover.candle_ix) else { return };

        let stroke = Stroke::new(1.0, CROSSHAIR_COLOR);
        painter.extend(Shape::dashed_line(
            &[pos2(hover.pos.x, plot.top()), pos2(hover.pos.x, plot.bottom())],
            stroke,
            4.0,
            4.0,
        ));
        painter.extend(Shape::dashed_line(
            &[pos2(rect.left(), hover.pos.y), pos2(rect.right(), hover.pos.y)],
            stroke,
            4.0,
            4.0,
        ));

        let anchor = tooltip_anchor(rect, hover.pos);
        let tooltip = Rect::from_min_size(anchor, egui::vec2(TOOLTIP_WIDTH, TOOLTIP_HEIGHT));
        painter.rect_filled(tooltip, 2.0, TOOLTIP_BG_COLOR);
        painter.rect_stroke(tooltip, 2.0, Stroke::new(1.0, ACCENT_COLOR), StrokeKind::Inside);

        let lines = [
            format!("O {}", format_price(candle.open, self.price_decimals)),
            format!("H {}", format_price(candle.high, self.price_decimals)),
            format!("L {}", format_price(candle.low, self.price_decimals)),
            format!("C {}", format_price(candle.close, self.price_decimals)),
            format!("V {}", format_volume(candle.volume)),
        ];
        for (ix, line) in lines.iter().enumerate() {
            painter.text(
                pos2(tooltip.left() + 8.0, tooltip.top() + 8.0 + ix as f32 * 14.0),
                Align2::LEFT_TOP,
                line,
                FontId::monospace(11.0),
                TOOLTIP_TEXT_COLOR,
            );
        }
    }
}

impl Default for ChartWidget {
    fn default() -> Self {
        Self::new()
    }
}

/// Split the plotting region into a price pane and an optional volume pane
/// below it.
fn split_panes(plot: Rect, show_volume: bool) -> (Rect, Option<Rect>) {
    if !show_volume {
        return (plot, None);
    }
    let volume_height = plot.height() * VOLUME_HEIGHT_RATIO;
    let price = Rect::from_min_max(plot.min, pos2(plot.right(), plot.bottom() - volume_height - 4.0));
    let volume = Rect::from_min_max(pos2(plot.left(), plot.bottom() - volume_height), plot.max);
    (price, Some(volume))
}

/// Tooltip anchor next to the pointer, flipped and clamped so the box never
/// leaves the widget rect.
fn tooltip_anchor(rect: Rect, pointer: Pos2) -> Pos2 {
    let mut x = pointer.x + 10.0;
    let mut y = pointer.y - 10.0;
    if x + TOOLTIP_WIDTH > rect.right() {
        x = pointer.x - TOOLTIP_WIDTH - 10.0;
    }
    if y + TOOLTIP_HEIGHT > rect.bottom() {
        y = pointer.y - TOOLTIP_HEIGHT - 10.0;
    }
    pos2(x.max(rect.left()), y.max(rect.top()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tooltip_never_leaves_rect() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(800.0, 600.0));
        let corners = [
            pos2(795.0, 595.0),
            pos2(2.0, 2.0),
            pos2(799.0, 1.0),
            pos2(1.0, 599.0),
            pos2(400.0, 300.0),
        ];
        for pointer in corners {
            let anchor = tooltip_anchor(rect, pointer);
            let tooltip = Rect::from_min_size(anchor, egui::vec2(TOOLTIP_WIDTH, TOOLTIP_HEIGHT));
            assert!(rect.contains_rect(tooltip), "pointer {pointer:?} -> {tooltip:?}");
        }
    }

    #[test]
    fn test_split_panes() {
        let plot = Rect::from_min_max(pos2(60.0, 8.0), pos2(860.0, 608.0));

        let (price, volume) = split_panes(plot, false);
        assert_eq!(price, plot);
        assert!(volume.is_none());

        let (price, volume) = split_panes(plot, true);
        let volume = volume.unwrap();
        assert!(price.bottom() < volume.top());
        assert_eq!(volume.bottom(), plot.bottom());
        assert!((volume.height() - plot.height() * VOLUME_HEIGHT_RATIO).abs() < 0.5);
    }

    #[test]
    fn test_empty_widget_has_no_window() {
        // The draw pass guards on visible_window; with no candles it must
        // report nothing to draw.
        let widget = ChartWidget::new();
        assert!(widget.manager.is_empty());
        assert_eq!(
            super::super::scale::visible_window(widget.manager.len(), 50, 0.0, 1.0),
            None
        );
    }
}
