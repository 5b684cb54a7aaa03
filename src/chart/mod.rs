//! Candlestick chart: candle store, coordinate mapping, interaction state
//! and the egui widget that ties them together.

pub mod base;
pub mod manager;
pub mod scale;
pub mod view;
pub mod widget;

pub use base::{format_price, format_volume};
pub use manager::CandleManager;
pub use scale::ChartScale;
pub use view::{GestureMode, HoverTarget, Tool, ViewState};
pub use widget::ChartWidget;
