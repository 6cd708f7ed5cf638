//! HTTP client for the Serper API (`google.serper.dev`).
//!
//! Every operation builds a JSON payload, POSTs it to a fixed upstream path
//! with the `X-API-KEY` header, and passes the JSON response through with
//! minimal reshaping. Transient failures are retried with backoff.

mod client;
mod endpoint;

pub use client::{SerperClient, SERPER_API_BASE};
pub use endpoint::SearchVertical;

/// Errors that can occur when talking to the Serper API
#[derive(Debug, thiserror::Error)]
pub enum SerperError {
    /// Missing or invalid local configuration (e.g. no API key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success status from the API, with the response body
    #[error("Serper API error: {status} {body}")]
    Api {
        status: u16,
        body: String,
    },

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Response body was not valid JSON
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid request parameters, caught before any HTTP call
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for SerperError {
    fn from(err: reqwest::Error) -> Self {
        SerperError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SerperError {
    fn from(err: serde_json::Error) -> Self {
        SerperError::Parse(format!("JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SerperError::Api {
            status: 403,
            body: "invalid key".to_string(),
        };
        assert_eq!(err.to_string(), "Serper API error: 403 invalid key");

        let err = SerperError::Config("SERPER_API_KEY not set".to_string());
        assert!(err.to_string().contains("SERPER_API_KEY"));
    }
}
