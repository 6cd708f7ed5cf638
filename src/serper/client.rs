//! Serper API client implementation.

use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::models::{
    AutocompleteQuery, CompetitorAnalysisRequest, HealthStatus, KeywordResearchRequest,
    LensRequest, ScrapeRequest, SearchRequest, SerpAnalysisRequest, WebpageRequest,
};
use crate::serper::{SearchVertical, SerperError};
use crate::utils::{api_retry_config, with_retry, HttpClient};

/// Base URL for the Serper API
pub const SERPER_API_BASE: &str = "https://google.serper.dev";

/// Client for the Serper API.
///
/// Holds a shared HTTP client and the API key. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct SerperClient {
    client: Arc<HttpClient>,
    api_key: String,
    base_url: String,
}

impl SerperClient {
    /// Create a new client with an explicit API key
    pub fn new(api_key: impl Into<String>) -> Result<Self, SerperError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(SerperError::Config("Serper API key is empty".to_string()));
        }

        Ok(Self {
            client: Arc::new(HttpClient::new()?),
            api_key,
            base_url: SERPER_API_BASE.to_string(),
        })
    }

    /// Create a client from the `SERPER_API_KEY` environment variable
    pub fn from_env() -> Result<Self, SerperError> {
        let api_key = std::env::var("SERPER_API_KEY").map_err(|_| {
            SerperError::Config("SERPER_API_KEY environment variable is required".to_string())
        })?;
        Self::new(api_key)
    }

    /// Override the upstream base URL (used by tests against a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// POST a JSON payload to an upstream path and return the parsed response
    async fn post_json<T: Serialize>(&self, path: &str, payload: &T) -> Result<Value, SerperError> {
        let url = format!("{}{}", self.base_url, path);
        let payload = serde_json::to_value(payload)?;

        let client = Arc::clone(&self.client);
        let api_key = self.api_key.clone();

        with_retry(api_retry_config(), || {
            let client = Arc::clone(&client);
            let url = url.clone();
            let api_key = api_key.clone();
            let payload = payload.clone();
            async move {
                let response = client
                    .client()
                    .post(&url)
                    .header("X-API-KEY", &api_key)
                    .header("Content-Type", "application/json")
                    .json(&payload)
                    .send()
                    .await
                    .map_err(|e| SerperError::Network(format!("request to {} failed: {}", url, e)))?;

                let status = response.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(SerperError::RateLimit);
                }
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(SerperError::Api {
                        status: status.as_u16(),
                        body,
                    });
                }

                response
                    .json::<Value>()
                    .await
                    .map_err(|e| SerperError::Parse(format!("invalid JSON from {}: {}", url, e)))
            }
        })
        .await
    }

    /// Search one of the SERP verticals
    pub async fn search(
        &self,
        vertical: SearchVertical,
        request: &SearchRequest,
    ) -> Result<Value, SerperError> {
        if request.q.trim().is_empty() {
            return Err(SerperError::InvalidRequest("query is empty".to_string()));
        }
        tracing::debug!(vertical = %vertical, query = %request.q, "searching Serper");
        self.post_json(vertical.path(), request).await
    }

    /// Extract the content of a web page
    pub async fn scrape(&self, request: &ScrapeRequest) -> Result<Value, SerperError> {
        self.post_json("/scrape", request).await
    }

    /// Detailed information about a specific web page
    pub async fn webpage(&self, request: &WebpageRequest) -> Result<Value, SerperError> {
        self.post_json("/webpage", request).await
    }

    /// Reverse image search via Google Lens
    pub async fn lens(&self, request: &LensRequest) -> Result<Value, SerperError> {
        self.post_json("/lens", request).await
    }

    /// Autocomplete suggestions for a batch of queries.
    ///
    /// The payload is a JSON array, one entry per query.
    pub async fn autocomplete(
        &self,
        queries: &[AutocompleteQuery],
    ) -> Result<Value, SerperError> {
        if queries.is_empty() {
            return Err(SerperError::InvalidRequest(
                "no queries provided for autocomplete".to_string(),
            ));
        }
        let response = self.post_json("/autocomplete", &queries).await?;
        Ok(json!({ "autocompleteData": response }))
    }

    /// Analyze a SERP for a query
    pub async fn analyze_serp(
        &self,
        request: &SerpAnalysisRequest,
    ) -> Result<Value, SerperError> {
        let response = self.post_json("/analyze-serp", request).await?;
        Ok(json!({ "analyzedData": response }))
    }

    /// Research keywords related to a seed keyword
    pub async fn research_keywords(
        &self,
        request: &KeywordResearchRequest,
    ) -> Result<Value, SerperError> {
        let response = self.post_json("/keyword-research", request).await?;
        Ok(json!({ "keywordData": response }))
    }

    /// Analyze competitors for a domain
    pub async fn analyze_competitors(
        &self,
        request: &CompetitorAnalysisRequest,
    ) -> Result<Value, SerperError> {
        let response = self.post_json("/competitor-analysis", request).await?;
        Ok(json!({ "competitorData": response }))
    }

    /// Probe upstream health.
    ///
    /// Never returns an error: failures are folded into the status value.
    pub async fn health(&self) -> HealthStatus {
        let url = format!("{}/health", self.base_url);

        let result = self
            .client
            .client()
            .get(&url)
            .header("X-API-KEY", &self.api_key)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => HealthStatus::healthy(),
            Ok(response) => {
                HealthStatus::unhealthy(format!("status code: {}", response.status().as_u16()))
            }
            Err(e) => {
                tracing::warn!("health check failed: {}", e);
                HealthStatus::unhealthy(e.to_string())
            }
        }
    }
}
