//! Tool handlers backed by the Serper client.
//!
//! Each handler validates and defaults its arguments, then delegates to one
//! client call. Errors are surfaced as strings for the protocol layer.

use std::sync::Arc;

use serde_json::Value;

use crate::mcp::tools::ToolHandler;
use crate::models::{
    AutocompleteQuery, CompetitorAnalysisRequest, KeywordResearchRequest, LensRequest,
    ScrapeRequest, SearchRequest, SerpAnalysisRequest, WebpageRequest,
};
use crate::serper::{SearchVertical, SerperClient};
use crate::utils::{clamp_result_count, validate_locale_code, validate_url};

/// Handler shared by all ten SERP verticals
#[derive(Debug, Clone)]
pub struct VerticalSearchHandler {
    pub client: Arc<SerperClient>,
    pub vertical: SearchVertical,
}

#[async_trait::async_trait]
impl ToolHandler for VerticalSearchHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let mut request: SearchRequest =
            serde_json::from_value(args).map_err(|e| format!("invalid arguments: {}", e))?;

        request.gl = validate_locale_code(&request.gl).map_err(|e| e.to_string())?;
        request.hl = validate_locale_code(&request.hl).map_err(|e| e.to_string())?;
        if let Some(num) = request.num {
            request.num = Some(clamp_result_count(num as i64));
        }

        self.client
            .search(self.vertical, &request)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Handler for the `scrape` tool
#[derive(Debug, Clone)]
pub struct ScrapeHandler {
    pub client: Arc<SerperClient>,
}

#[async_trait::async_trait]
impl ToolHandler for ScrapeHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let mut request: ScrapeRequest =
            serde_json::from_value(args).map_err(|e| format!("invalid arguments: {}", e))?;
        request.url = validate_url(&request.url).map_err(|e| e.to_string())?;

        self.client.scrape(&request).await.map_err(|e| e.to_string())
    }
}

/// Handler for the `webpage_search` tool
#[derive(Debug, Clone)]
pub struct WebpageHandler {
    pub client: Arc<SerperClient>,
}

#[async_trait::async_trait]
impl ToolHandler for WebpageHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let mut request: WebpageRequest =
            serde_json::from_value(args).map_err(|e| format!("invalid arguments: {}", e))?;
        request.url = validate_url(&request.url).map_err(|e| e.to_string())?;

        self.client
            .webpage(&request)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Handler for the `lens_search` tool.
///
/// The tool argument is `image_url`; upstream wants it as `url`.
#[derive(Debug, Clone)]
pub struct LensHandler {
    pub client: Arc<SerperClient>,
}

#[async_trait::async_trait]
impl ToolHandler for LensHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let image_url = args
            .get("image_url")
            .and_then(|v| v.as_str())
            .ok_or("missing required argument: image_url")?;
        let url = validate_url(image_url).map_err(|e| e.to_string())?;

        let request = LensRequest {
            url,
            gl: locale_or_default(&args, "gl", "us")?,
            hl: locale_or_default(&args, "hl", "en")?,
            location: args
                .get("location")
                .and_then(|v| v.as_str())
                .map(String::from),
        };

        self.client.lens(&request).await.map_err(|e| e.to_string())
    }
}

/// Handler for the `autocomplete` tool.
///
/// Takes a list of query strings plus shared locale parameters and expands
/// them into the batch payload.
#[derive(Debug, Clone)]
pub struct AutocompleteHandler {
    pub client: Arc<SerperClient>,
}

#[async_trait::async_trait]
impl ToolHandler for AutocompleteHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let queries = args
            .get("queries")
            .and_then(|v| v.as_array())
            .ok_or("missing required argument: queries")?;

        let gl = locale_or_default(&args, "gl", "us")?;
        let hl = locale_or_default(&args, "hl", "en")?;
        let location = args
            .get("location")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(String::from);

        let mut batch = Vec::with_capacity(queries.len());
        for entry in queries {
            let q = entry
                .as_str()
                .ok_or("invalid arguments: queries entries must be strings")?;
            batch.push(AutocompleteQuery {
                q: q.to_string(),
                gl: gl.clone(),
                hl: hl.clone(),
                location: location.clone(),
            });
        }

        self.client
            .autocomplete(&batch)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Handler for the `analyze_serp` tool
#[derive(Debug, Clone)]
pub struct AnalyzeSerpHandler {
    pub client: Arc<SerperClient>,
}

#[async_trait::async_trait]
impl ToolHandler for AnalyzeSerpHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let request: SerpAnalysisRequest =
            serde_json::from_value(args).map_err(|e| format!("invalid arguments: {}", e))?;

        self.client
            .analyze_serp(&request)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Handler for the `research_keywords` tool
#[derive(Debug, Clone)]
pub struct ResearchKeywordsHandler {
    pub client: Arc<SerperClient>,
}

#[async_trait::async_trait]
impl ToolHandler for ResearchKeywordsHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let request: KeywordResearchRequest =
            serde_json::from_value(args).map_err(|e| format!("invalid arguments: {}", e))?;

        self.client
            .research_keywords(&request)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Handler for the `analyze_competitors` tool
#[derive(Debug, Clone)]
pub struct AnalyzeCompetitorsHandler {
    pub client: Arc<SerperClient>,
}

#[async_trait::async_trait]
impl ToolHandler for AnalyzeCompetitorsHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        let request: CompetitorAnalysisRequest =
            serde_json::from_value(args).map_err(|e| format!("invalid arguments: {}", e))?;

        self.client
            .analyze_competitors(&request)
            .await
            .map_err(|e| e.to_string())
    }
}

/// Handler for the `_health` tool
#[derive(Debug, Clone)]
pub struct HealthHandler {
    pub client: Arc<SerperClient>,
}

#[async_trait::async_trait]
impl ToolHandler for HealthHandler {
    async fn execute(&self, _args: Value) -> Result<Value, String> {
        let status = self.client.health().await;
        serde_json::to_value(status).map_err(|e| e.to_string())
    }
}

fn locale_or_default(args: &Value, key: &str, default: &str) -> Result<String, String> {
    match args.get(key).and_then(|v| v.as_str()) {
        Some(code) => validate_locale_code(code).map_err(|e| e.to_string()),
        None => Ok(default.to_string()),
    }
}
