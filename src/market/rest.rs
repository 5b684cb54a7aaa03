//! Shared REST helper for the provider adapters.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::error::SourceError;

/// Per-request timeout so one unresponsive provider cannot stall the
/// whole fallback chain.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin JSON-over-HTTP client shared by every provider adapter.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
}

impl RestClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("candleboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Build a URL with query parameters appended.
    pub fn url_with_params<'a>(
        base: &str,
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<String, SourceError> {
        let url = Url::parse_with_params(base, params).map_err(|e| SourceError::Malformed {
            field: "url",
            value: e.to_string(),
        })?;
        Ok(url.into())
    }

    /// GET a URL and parse the body as JSON.
    ///
    /// Non-success statuses become `Status` errors, except 429 which is
    /// reported as `RateLimited` so the chain logs it distinctly.
    pub async fn get_json(&self, url: &str) -> Result<Value, SourceError> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            if status.as_u16() == 429 {
                warn!("rate limit hit: {}", url);
                return Err(SourceError::RateLimited(text));
            }
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|_| SourceError::Malformed {
            field: "body",
            value: truncate(&text, 200),
        })
    }
}

impl Default for RestClient {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_with_params() {
        let url = RestClient::url_with_params(
            "https://api.example.com/v1/series",
            [("symbol", "AAPL"), ("limit", "100")],
        )
        .unwrap();
        assert_eq!(url, "https://api.example.com/v1/series?symbol=AAPL&limit=100");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 200), "short");
        let long = "é".repeat(300);
        let cut = truncate(&long, 201);
        assert!(cut.len() <= 205);
        assert!(cut.ends_with('…'));
    }
}
