//! Ephemeral interaction state for the chart.
//!
//! Everything the render pass depends on besides the candle data lives in
//! one `ViewState` struct, so a frame is a deterministic function of
//! `(candles, view)` and the interaction logic is testable without a UI.

use egui::Pos2;

use super::base::{MAX_ZOOM, MIN_ZOOM, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR};

/// Toolbar tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Pointer,
    Crosshair,
    TrendLine,
    Brush,
    Rectangle,
    Text,
    Measure,
    Eraser,
}

impl Tool {
    pub fn all() -> [Tool; 8] {
        [
            Tool::Pointer,
            Tool::Crosshair,
            Tool::TrendLine,
            Tool::Brush,
            Tool::Rectangle,
            Tool::Text,
            Tool::Measure,
            Tool::Eraser,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tool::Pointer => "Pointer",
            Tool::Crosshair => "Crosshair",
            Tool::TrendLine => "Trend Line",
            Tool::Brush => "Brush",
            Tool::Rectangle => "Rectangle",
            Tool::Text => "Text",
            Tool::Measure => "Measure",
            Tool::Eraser => "Eraser",
        }
    }

    /// Every tool except the pointer and crosshair records freehand points
    /// while the button is held.
    pub fn is_drawing(&self) -> bool {
        !matches!(self, Tool::Pointer | Tool::Crosshair)
    }
}

/// What the pointer is currently doing. Entered on pointer-down based on the
/// tool selected at that moment; tool changes never retarget an in-progress
/// gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureMode {
    Idle,
    Panning,
    Drawing,
}

/// Candle currently under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoverTarget {
    pub candle_ix: usize,
    pub pos: Pos2,
}

/// All interaction state for the chart, mutated only by user input and
/// discarded on reload.
pub struct ViewState {
    pub tool: Tool,
    pub zoom: f32,
    /// Pixels scrolled back in time; 0 shows the newest candles.
    pub scroll_offset: f32,
    pub hover: Option<HoverTarget>,
    pub gesture: GestureMode,
    /// In-progress or last-completed freehand path, screen coordinates.
    pub drawing: Vec<Pos2>,
    /// User-placed horizontal price levels.
    pub annotations: Vec<f64>,
    pub show_volume: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            tool: Tool::Pointer,
            zoom: 1.0,
            scroll_offset: 0.0,
            hover: None,
            gesture: GestureMode::Idle,
            drawing: Vec::new(),
            annotations: Vec::new(),
            show_volume: true,
        }
    }

    /// Multiply zoom per wheel event: up zooms in, down zooms out, always
    /// clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn apply_wheel(&mut self, delta_y: f32) {
        if delta_y == 0.0 {
            return;
        }
        let factor = if delta_y > 0.0 { ZOOM_IN_FACTOR } else { ZOOM_OUT_FACTOR };
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Pointer-down. The selected tool decides the gesture: pointer pans,
    /// crosshair does nothing, drawing tools start a fresh path.
    pub fn begin_gesture(&mut self, pos: Pos2) {
        self.gesture = match self.tool {
            Tool::Pointer => GestureMode::Panning,
            tool if tool.is_drawing() => {
                self.drawing = vec![pos];
                GestureMode::Drawing
            }
            _ => GestureMode::Idle,
        };
    }

    /// Pointer-move while the button is held.
    pub fn drag_to(&mut self, pos: Pos2, delta_x: f32) {
        match self.gesture {
            GestureMode::Panning => {
                // Dragging right reveals older candles
                self.scroll_offset = (self.scroll_offset + delta_x).max(0.0);
            }
            GestureMode::Drawing => self.drawing.push(pos),
            GestureMode::Idle => {}
        }
    }

    /// Pointer-up or pointer-leave.
    pub fn end_gesture(&mut self) {
        self.gesture = GestureMode::Idle;
    }

    /// Select a tool. The eraser additionally wipes the freehand path and
    /// every price-level annotation.
    pub fn select_tool(&mut self, tool: Tool) {
        if tool == Tool::Eraser {
            self.drawing.clear();
            self.annotations.clear();
        }
        self.tool = tool;
    }

    /// Keep the scroll offset inside `[0, max]`.
    pub fn clamp_scroll(&mut self, max: f32) {
        self.scroll_offset = self.scroll_offset.clamp(0.0, max.max(0.0));
    }

    /// Called when a new candle series is committed: jump back to the
    /// newest window and drop the hover target. Zoom, tool and drawings
    /// survive a symbol change.
    pub fn reset_viewport(&mut self) {
        self.scroll_offset = 0.0;
        self.hover = None;
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}
