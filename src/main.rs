//! Candleboard - Main Application Entry Point
//!
//! Starts the tokio runtime, the market-data HTTP endpoint and the egui
//! chart window.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use candleboard::market::MarketDataService;
use candleboard::setting::SETTINGS;
use candleboard::CandleboardApp;

/// Initialize logging system
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn server_addr() -> SocketAddr {
    let host = SETTINGS
        .get_string("server.host")
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = SETTINGS.get_int("server.port").unwrap_or(3777) as u16;
    format!("{host}:{port}")
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 3777)))
}

/// Create native window options
fn create_native_options() -> eframe::NativeOptions {
    eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Candleboard")
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    // Create tokio runtime
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    setup_logging();

    info!("starting candleboard");
    info!("version: {}", candleboard::VERSION);
    info!("rust version: {}", rustc_version_runtime::version());

    let service = Arc::new(MarketDataService::new());

    // HTTP endpoint runs alongside the window for the lifetime of the app
    let addr = server_addr();
    {
        let service = service.clone();
        runtime.spawn(async move {
            if let Err(err) = candleboard::server::serve(service, addr).await {
                warn!("market-data endpoint stopped: {err}");
            }
        });
    }

    let handle = runtime.handle().clone();
    eframe::run_native(
        "Candleboard",
        create_native_options(),
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(CandleboardApp::new(service, handle)))
        }),
    )
    .map_err(|e| format!("Failed to run application: {}", e))?;

    Ok(())
}
