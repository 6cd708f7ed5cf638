//! Request payloads for the Serper API.
//!
//! Every struct here serializes directly into the JSON body sent upstream.
//! Optional fields are omitted from the payload when unset; Serper treats a
//! missing key as "use the default". Advanced search operators (`site`,
//! `filetype`, ...) travel as top-level payload keys, not folded into `q`.

use serde::{Deserialize, Serialize};

fn default_gl() -> String {
    "us".to_string()
}

fn default_hl() -> String {
    "en".to_string()
}

fn default_true() -> bool {
    true
}

/// Payload for the SERP endpoints (`/search`, `/images`, `/news`, ...).
///
/// Only `q` is required. `gl` (ISO 3166-1 alpha-2 region) and `hl` (ISO 639-1
/// language) default to `"us"` / `"en"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Search query string
    pub q: String,

    /// Region code for results (e.g. "us", "br")
    #[serde(default = "default_gl")]
    pub gl: String,

    /// Language code for results (e.g. "en", "pt")
    #[serde(default = "default_hl")]
    pub hl: String,

    /// Whether to autocorrect spelling in the query
    #[serde(default = "default_true")]
    pub autocorrect: bool,

    /// Location for localized results (e.g. "Sao Paulo, Brazil")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Number of results to return (Serper default: 10)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num: Option<u32>,

    /// Result page number (Serper default: 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Time-based filter ('qdr:h', 'qdr:d', 'qdr:w', 'qdr:m', 'qdr:y')
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tbs: Option<String>,

    /// Limit results to a specific domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<String>,

    /// Limit to specific file types (e.g. 'pdf', 'doc')
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filetype: Option<String>,

    /// Pages with word in the URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inurl: Option<String>,

    /// Pages with word in the title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intitle: Option<String>,

    /// Sites similar to a domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,

    /// Google's cached version of a URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<String>,

    /// Results dated before (YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,

    /// Results dated after (YYYY-MM-DD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,

    /// Exact phrase match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<String>,

    /// Comma-separated terms to exclude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,

    /// Comma-separated alternative terms
    #[serde(
        rename = "or",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub or_terms: Option<String>,

    /// Vertical-specific keys (`year_min`/`year_max` for scholar,
    /// `patent_office` for patents). Forwarded verbatim; Serper ignores
    /// keys an endpoint does not know.
    #[serde(flatten, default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SearchRequest {
    /// Create a new request with default region/language
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            gl: default_gl(),
            hl: default_hl(),
            autocorrect: true,
            location: None,
            num: None,
            page: None,
            tbs: None,
            site: None,
            filetype: None,
            inurl: None,
            intitle: None,
            related: None,
            cache: None,
            before: None,
            after: None,
            exact: None,
            exclude: None,
            or_terms: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn gl(mut self, gl: impl Into<String>) -> Self {
        self.gl = gl.into();
        self
    }

    pub fn hl(mut self, hl: impl Into<String>) -> Self {
        self.hl = hl.into();
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn num(mut self, num: u32) -> Self {
        self.num = Some(num);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn tbs(mut self, tbs: impl Into<String>) -> Self {
        self.tbs = Some(tbs.into());
        self
    }
}

/// Payload for `POST /scrape`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    /// URL of the web page to extract
    pub url: String,

    /// Whether to include markdown-formatted content
    #[serde(default)]
    pub include_markdown: bool,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            include_markdown: false,
        }
    }

    pub fn include_markdown(mut self, include: bool) -> Self {
        self.include_markdown = include;
        self
    }
}

/// One entry of the `/autocomplete` batch payload.
///
/// The endpoint takes a JSON array of these, one per query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutocompleteQuery {
    pub q: String,

    #[serde(default = "default_gl")]
    pub gl: String,

    #[serde(default = "default_hl")]
    pub hl: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl AutocompleteQuery {
    pub fn new(q: impl Into<String>) -> Self {
        Self {
            q: q.into(),
            gl: default_gl(),
            hl: default_hl(),
            location: None,
        }
    }
}

/// Payload for `POST /webpage` (detailed page information).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebpageRequest {
    pub url: String,
}

/// Payload for `POST /lens` (reverse image search).
///
/// The tool surface calls this parameter `image_url`; upstream wants `url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LensRequest {
    pub url: String,

    #[serde(default = "default_gl")]
    pub gl: String,

    #[serde(default = "default_hl")]
    pub hl: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Payload for `POST /analyze-serp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpAnalysisRequest {
    pub query: String,

    #[serde(default = "default_gl")]
    pub gl: String,

    #[serde(default = "default_hl")]
    pub hl: String,

    #[serde(default = "default_google_domain")]
    pub google_domain: String,

    #[serde(default = "default_num")]
    pub num: u32,

    #[serde(default = "default_device")]
    pub device: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Safe search mode ("active" or "off")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe: Option<String>,
}

fn default_google_domain() -> String {
    "google.com".to_string()
}

fn default_num() -> u32 {
    10
}

fn default_device() -> String {
    "desktop".to_string()
}

/// Payload for `POST /keyword-research`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordResearchRequest {
    pub keyword: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default)]
    pub include_questions: bool,

    #[serde(default)]
    pub include_related: bool,

    #[serde(default)]
    pub include_suggestions: bool,
}

/// Payload for `POST /competitor-analysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorAnalysisRequest {
    pub domain: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_results: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_features: Option<bool>,
}

/// Upstream health probe outcome.
///
/// A failed probe is a value, not an error: callers surface it as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            version: Some(crate::VERSION.to_string()),
            error: None,
        }
    }

    pub fn unhealthy(error: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            version: None,
            error: Some(error.into()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
