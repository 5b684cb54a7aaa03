//! Inbound HTTP endpoint: `GET /market-data?symbol=&timeframe=`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::market::{classify, Candle, MarketDataService, Timeframe};

#[derive(Debug, Deserialize)]
pub struct MarketDataQuery {
    symbol: Option<String>,
    timeframe: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarketDataResponse {
    pub success: bool,
    pub symbol: String,
    pub timeframe: String,
    #[serde(rename = "assetType")]
    pub asset_type: String,
    /// Chronological, oldest first.
    pub data: Vec<Candle>,
    pub count: usize,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct MarketDataFailure {
    pub success: bool,
    pub error: String,
    pub timestamp: String,
}

pub fn router(service: Arc<MarketDataService>) -> Router {
    Router::new()
        .route("/market-data", get(market_data))
        .with_state(service)
}

async fn market_data(
    State(service): State<Arc<MarketDataService>>,
    Query(query): Query<MarketDataQuery>,
) -> Result<Json<MarketDataResponse>, (StatusCode, Json<MarketDataFailure>)> {
    let symbol = query.symbol.unwrap_or_else(|| "AAPL".to_string());
    let timeframe = query
        .timeframe
        .as_deref()
        .and_then(Timeframe::parse)
        .unwrap_or(Timeframe::D1);

    let asset_type = classify(&symbol);
    info!("fetching {} ({}) with timeframe {}", symbol, asset_type, timeframe);

    match service.fetch_with_fallback(&symbol, timeframe, asset_type).await {
        Ok(data) => Ok(Json(MarketDataResponse {
            success: true,
            symbol,
            timeframe: timeframe.wire_name().to_string(),
            asset_type: asset_type.wire_name().to_string(),
            count: data.len(),
            data,
            timestamp: Utc::now().to_rfc3339(),
        })),
        Err(e) => {
            error!("market data request failed: {}", e);
            Err((
                StatusCode::BAD_GATEWAY,
                Json(MarketDataFailure {
                    success: false,
                    error: e.to_string(),
                    timestamp: Utc::now().to_rfc3339(),
                }),
            ))
        }
    }
}

/// Bind and serve the endpoint until the process exits.
pub async fn serve(service: Arc<MarketDataService>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("market data endpoint listening on http://{}/market-data", addr);
    axum::serve(listener, router(service)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[test]
    fn test_success_body_shape() {
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
        let response = MarketDataResponse {
            success: true,
            symbol: "BTC".to_string(),
            timeframe: "1D".to_string(),
            asset_type: "CRYPTO".to_string(),
            count: 1,
            data: vec![candle],
            timestamp: Utc::now().to_rfc3339(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["assetType"], "CRYPTO");
        assert_eq!(json["count"], 1);
        assert_eq!(json["data"][0]["date"], "2024-06-01T00:00:00Z");
    }

    #[test]
    fn test_failure_body_shape() {
        let failure = MarketDataFailure {
            success: false,
            error: "all data sources failed for X".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("failed"));
    }
}
