//! Desktop application shell: wires the market-data service to the chart
//! widget and owns the async fetch lifecycle.
//!
//! Fetches run on the tokio runtime and report back over a channel; each
//! request carries a sequence number so a slow response for a previously
//! selected symbol can never overwrite the chart after the user has already
//! moved on.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use eframe::egui;
use tracing::{debug, info, warn};

use crate::chart::base::{BEAR_COLOR, BULL_COLOR};
use crate::chart::{format_price, ChartWidget, Tool};
use crate::market::{classify, synthetic, MarketDataService, Timeframe};
use crate::setting::SETTINGS;

/// Monotonic fetch sequencer. Only the most recently issued sequence number
/// is allowed to commit its result.
#[derive(Debug, Default)]
pub struct RequestGuard {
    latest: u64,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self { latest: 0 }
    }

    /// Hand out the next sequence number, invalidating all earlier ones.
    pub fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest
    }
}

/// Completed fetch, successful or degraded, delivered back to the UI thread.
pub struct FetchResult {
    pub seq: u64,
    pub symbol: String,
    pub timeframe: Timeframe,
    pub candles: Vec<crate::market::Candle>,
    /// Set when every provider failed and the series is synthetic.
    pub note: Option<String>,
}

pub struct CandleboardApp {
    service: Arc<MarketDataService>,
    runtime: tokio::runtime::Handle,
    chart: ChartWidget,
    guard: RequestGuard,
    tx: Sender<FetchResult>,
    rx: Receiver<FetchResult>,
    /// Contents of the symbol text box, committed on Enter.
    symbol_input: String,
    /// Symbol the chart currently shows (or is loading).
    active_symbol: String,
    timeframe: Timeframe,
    loading: bool,
    banner: Option<String>,
}

impl CandleboardApp {
    pub fn new(service: Arc<MarketDataService>, runtime: tokio::runtime::Handle) -> Self {
        let (tx, rx) = channel();
        let symbol = SETTINGS
            .get_string("chart.default_symbol")
            .unwrap_or_else(|| "AAPL".to_string());
        let timeframe = SETTINGS
            .get_string("chart.default_timeframe")
            .and_then(|s| Timeframe::parse(&s))
            .unwrap_or(Timeframe::D1);

        let mut app = Self {
            service,
            runtime,
            chart: ChartWidget::new(),
            guard: RequestGuard::new(),
            tx,
            rx,
            symbol_input: symbol.clone(),
            active_symbol: symbol,
            timeframe,
            loading: false,
            banner: None,
        };
        if let Some(show) = SETTINGS.get_bool("chart.show_volume") {
            app.chart.view.show_volume = show;
        }
        app.request_data();
        app
    }

    /// Kick off a fetch for the active symbol and timeframe. The sequence
    /// number issued here is the only one whose result may commit.
    fn request_data(&mut self) {
        let seq = self.guard.issue();
        self.loading = true;
        self.banner = None;

        let service = self.service.clone();
        let symbol = self.active_symbol.clone();
        let timeframe = self.timeframe;
        let tx = self.tx.clone();

        info!("requesting {} {} (seq {})", symbol, timeframe.wire_name(), seq);
        self.runtime.spawn(async move {
            let (candles, note) = match service.get_market_data(&symbol, timeframe).await {
                Ok(candles) => (candles, None),
                Err(err) => {
                    warn!("{err}");
                    (
                        synthetic::mock_series(synthetic::SYNTHETIC_COUNT),
                        Some(format!("Live data unavailable for {symbol}, showing simulated data")),
                    )
                }
            };
            // Receiver gone means the app is shutting down
            let _ = tx.send(FetchResult { seq, symbol, timeframe, candles, note });
        });
    }

    /// Drain completed fetches, committing only the current one. Stale
    /// results are logged and dropped.
    fn drain_results(&mut self) {
        while let Ok(result) = self.rx.try_recv() {
            self.apply_result(result);
        }
    }

    fn apply_result(&mut self, result: FetchResult) {
        if !self.guard.is_current(result.seq) {
            debug!(
                "dropping stale result for {} (seq {}, latest {})",
                result.symbol, result.seq, self.guard.latest
            );
            return;
        }
        info!(
            "committing {} candles for {} {}",
            result.candles.len(),
            result.symbol,
            result.timeframe.wire_name()
        );
        self.chart.update_history(result.candles);
        self.banner = result.note;
        self.loading = false;
    }

    fn commit_symbol_input(&mut self) {
        let symbol = self.symbol_input.trim().to_uppercase();
        if symbol.is_empty() || symbol == self.active_symbol {
            return;
        }
        self.symbol_input = symbol.clone();
        self.active_symbol = symbol;
        self.request_data();
    }

    fn select_timeframe(&mut self, timeframe: Timeframe) {
        if timeframe == self.timeframe {
            return;
        }
        self.timeframe = timeframe;
        self.request_data();
    }

    fn top_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Symbol:");
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.symbol_input).desired_width(110.0),
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.commit_symbol_input();
            }

            let asset_type = classify(&self.active_symbol);
            ui.label(
                egui::RichText::new(asset_type.wire_name())
                    .small()
                    .color(egui::Color32::from_rgb(0x78, 0x7f, 0x8f)),
            );

            ui.separator();

            let mut selected = self.timeframe;
            egui::ComboBox::from_id_salt("timeframe")
                .selected_text(selected.wire_name())
                .show_ui(ui, |ui| {
                    for timeframe in Timeframe::all() {
                        ui.selectable_value(&mut selected, timeframe, timeframe.wire_name());
                    }
                });
            self.select_timeframe(selected);

            ui.separator();
            ui.checkbox(&mut self.chart.view.show_volume, "Volume");
            ui.label(format!("Zoom {:.0}%", self.chart.view.zoom * 100.0));

            // Last close and session change for the loaded series
            let candles = self.chart.manager.all();
            if let Some(last) = candles.last() {
                let prev_close = if candles.len() >= 2 {
                    candles[candles.len() - 2].close
                } else {
                    last.open
                };
                let change = last.close - prev_close;
                let percent = if prev_close != 0.0 { change / prev_close * 100.0 } else { 0.0 };
                let color = if change >= 0.0 { BULL_COLOR } else { BEAR_COLOR };
                ui.separator();
                ui.label(
                    egui::RichText::new(format!(
                        "{} {:+.2} ({:+.2}%)",
                        format_price(last.close, 2),
                        change,
                        percent
                    ))
                    .color(color),
                );
            }

            if self.loading {
                ui.spinner();
            }
        });

        if let Some(note) = &self.banner {
            ui.label(
                egui::RichText::new(note)
                    .small()
                    .color(egui::Color32::from_rgb(0xe0, 0xa8, 0x30)),
            );
        }
    }

    fn tool_panel(&mut self, ui: &mut egui::Ui) {
        ui.vertical(|ui| {
            for tool in Tool::all() {
                let selected = self.chart.view.tool == tool;
                if ui.selectable_label(selected, tool.label()).clicked() {
                    self.chart.view.select_tool(tool);
                }
            }
        });
    }
}

impl eframe::App for CandleboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_results();

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            self.top_bar(ui);
        });

        egui::SidePanel::left("tools")
            .resizable(false)
            .default_width(90.0)
            .show(ctx, |ui| {
                self.tool_panel(ui);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart.show(ui);
        });

        // Keep polling the fetch channel even without input events
        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::Candle;
    use chrono::{Duration, Utc};

    fn series(len: usize, base: f64) -> Vec<Candle> {
        (0..len)
            .map(|ix| Candle {
                date: Utc::now() - Duration::days((len - ix) as i64),
                open: base,
                high: base + 1.0,
                low: base - 1.0,
                close: base + 0.5,
                volume: 1000.0,
            })
            .collect()
    }

    fn test_app(runtime: &tokio::runtime::Runtime) -> CandleboardApp {
        let (tx, rx) = channel();
        CandleboardApp {
            service: Arc::new(MarketDataService::new()),
            runtime: runtime.handle().clone(),
            chart: ChartWidget::new(),
            guard: RequestGuard::new(),
            tx,
            rx,
            symbol_input: "AAPL".to_string(),
            active_symbol: "AAPL".to_string(),
            timeframe: Timeframe::D1,
            loading: false,
            banner: None,
        }
    }

    #[test]
    fn test_guard_only_latest_sequence_is_current() {
        let mut guard = RequestGuard::new();
        let first = guard.issue();
        let second = guard.issue();
        assert!(first < second);
        assert!(!guard.is_current(first));
        assert!(guard.is_current(second));

        let third = guard.issue();
        assert!(!guard.is_current(second));
        assert!(guard.is_current(third));
    }

    #[test]
    fn test_stale_result_never_overwrites_newer_commit() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = test_app(&runtime);

        // User picks MSFT, then switches to TSLA before MSFT resolves
        let msft_seq = app.guard.issue();
        let tsla_seq = app.guard.issue();

        // TSLA resolves first and commits
        app.apply_result(FetchResult {
            seq: tsla_seq,
            symbol: "TSLA".to_string(),
            timeframe: Timeframe::D1,
            candles: series(10, 250.0),
            note: None,
        });
        assert_eq!(app.chart.manager.len(), 10);
        let committed_close = app.chart.manager.get(0).unwrap().close;

        // The late MSFT response must be dropped
        app.apply_result(FetchResult {
            seq: msft_seq,
            symbol: "MSFT".to_string(),
            timeframe: Timeframe::D1,
            candles: series(42, 400.0),
            note: Some("stale".to_string()),
        });
        assert_eq!(app.chart.manager.len(), 10);
        assert_eq!(app.chart.manager.get(0).unwrap().close, committed_close);
        assert!(app.banner.is_none());
    }

    #[test]
    fn test_commit_resets_viewport_but_keeps_zoom() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = test_app(&runtime);
        app.chart.view.zoom = 2.0;
        app.chart.view.scroll_offset = 500.0;
        app.loading = true;

        let seq = app.guard.issue();
        app.apply_result(FetchResult {
            seq,
            symbol: "AAPL".to_string(),
            timeframe: Timeframe::D1,
            candles: series(5, 180.0),
            note: None,
        });

        assert!(!app.loading);
        assert_eq!(app.chart.view.scroll_offset, 0.0);
        assert_eq!(app.chart.view.zoom, 2.0);
    }

    #[test]
    fn test_degraded_result_sets_banner() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut app = test_app(&runtime);

        let seq = app.guard.issue();
        app.apply_result(FetchResult {
            seq,
            symbol: "AAPL".to_string(),
            timeframe: Timeframe::D1,
            candles: synthetic::mock_series(synthetic::SYNTHETIC_COUNT),
            note: Some("Live data unavailable for AAPL, showing simulated data".to_string()),
        });

        assert_eq!(app.chart.manager.len(), synthetic::SYNTHETIC_COUNT);
        assert!(app.banner.as_deref().unwrap().contains("simulated"));
    }

    #[test]
    fn test_symbol_commit_normalizes_and_ignores_noops() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let _guard = runtime.enter();
        let mut app = test_app(&runtime);

        app.symbol_input = "  tsla ".to_string();
        app.commit_symbol_input();
        assert_eq!(app.active_symbol, "TSLA");
        assert_eq!(app.symbol_input, "TSLA");
        let seq_after_change = app.guard.latest;

        // Re-committing the same symbol issues no new request
        app.commit_symbol_input();
        assert_eq!(app.guard.latest, seq_after_change);

        // Blank input is ignored
        app.symbol_input = "   ".to_string();
        app.commit_symbol_input();
        assert_eq!(app.active_symbol, "TSLA");
    }
}
