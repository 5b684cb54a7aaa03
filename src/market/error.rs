//! Error taxonomy for the market data fetcher.

use thiserror::Error;

/// Failure of a single data source. Always recovered locally: the fallback
/// chain logs it, records it and moves on to the next source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("no data: {0}")]
    NoData(String),

    #[error("{0} API key not configured")]
    MissingCredential(&'static str),

    #[error("malformed {field} value: {value}")]
    Malformed { field: &'static str, value: String },
}

/// Every source in the asset type's roster failed. The display message
/// concatenates each per-source failure in attempt order.
#[derive(Debug)]
pub struct AllSourcesExhausted {
    pub symbol: String,
    /// `(source name, failure message)` pairs in attempt order.
    pub attempts: Vec<(String, String)>,
}

impl std::fmt::Display for AllSourcesExhausted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "all data sources failed for {}. Errors: ", self.symbol)?;
        for (ix, (name, message)) in self.attempts.iter().enumerate() {
            if ix > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{name}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AllSourcesExhausted {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_message_keeps_attempt_order() {
        let err = AllSourcesExhausted {
            symbol: "AAPL".to_string(),
            attempts: vec![
                ("Polygon.io".to_string(), "no data: empty results".to_string()),
                ("Yahoo Finance".to_string(), "API error 404: not found".to_string()),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("AAPL"));
        let polygon = message.find("Polygon.io").unwrap();
        let yahoo = message.find("Yahoo Finance").unwrap();
        assert!(polygon < yahoo);
    }

    #[test]
    fn test_source_error_messages() {
        let err = SourceError::MissingCredential("Alpha Vantage");
        assert_eq!(err.to_string(), "Alpha Vantage API key not configured");

        let err = SourceError::Malformed {
            field: "close",
            value: "n/a".to_string(),
        };
        assert!(err.to_string().contains("close"));
        assert!(err.to_string().contains("n/a"));
    }
}
