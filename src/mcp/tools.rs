//! Tool registry for MCP tools.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::mcp::handlers::{
    AnalyzeCompetitorsHandler, AnalyzeSerpHandler, AutocompleteHandler, HealthHandler,
    LensHandler, ResearchKeywordsHandler, ScrapeHandler, VerticalSearchHandler, WebpageHandler,
};
use crate::serper::{SearchVertical, SerperClient};

/// An MCP tool that can be called by the client
#[derive(Clone)]
pub struct Tool {
    /// Tool name (e.g., "google_search")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: Value,

    /// Handler function to execute the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish()
    }
}

/// Handler for executing a tool
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync + std::fmt::Debug {
    /// Execute the tool with the given arguments
    async fn execute(&self, args: Value) -> Result<Value, String>;
}

/// Registry for all MCP tools
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create a registry with the full tool set backed by one Serper client.
    ///
    /// The ten SERP verticals share one parameterized handler; the remaining
    /// tools each get their own.
    pub fn from_client(client: Arc<SerperClient>) -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
            order: Vec::new(),
        };

        for vertical in SearchVertical::all() {
            registry.register(Tool {
                name: vertical.tool_name().to_string(),
                description: format!(
                    "Search the web via the Serper API and retrieve {}",
                    vertical.subject()
                ),
                input_schema: search_schema(*vertical),
                handler: Arc::new(VerticalSearchHandler {
                    client: client.clone(),
                    vertical: *vertical,
                }),
            });
        }

        registry.register(Tool {
            name: "scrape".to_string(),
            description: "Extract the content of a web page as text and optionally markdown, \
                          including JSON-LD and head metadata"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "The URL of the web page to extract"
                    },
                    "includeMarkdown": {
                        "type": "boolean",
                        "description": "Whether to include markdown content",
                        "default": false
                    }
                },
                "required": ["url"]
            }),
            handler: Arc::new(ScrapeHandler {
                client: client.clone(),
            }),
        });

        registry.register(Tool {
            name: "webpage_search".to_string(),
            description: "Retrieve detailed information about a specific web page".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "URL of the page to analyze"
                    }
                },
                "required": ["url"]
            }),
            handler: Arc::new(WebpageHandler {
                client: client.clone(),
            }),
        });

        registry.register(Tool {
            name: "lens_search".to_string(),
            description: "Reverse image search via Google Lens".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "image_url": {
                        "type": "string",
                        "description": "URL of the image to search for"
                    },
                    "gl": {
                        "type": "string",
                        "description": "Optional region code (ISO 3166-1 alpha-2)"
                    },
                    "hl": {
                        "type": "string",
                        "description": "Optional language code (ISO 639-1)"
                    },
                    "location": {
                        "type": "string",
                        "description": "Optional location for localized results"
                    }
                },
                "required": ["image_url"]
            }),
            handler: Arc::new(LensHandler {
                client: client.clone(),
            }),
        });

        registry.register(Tool {
            name: "autocomplete".to_string(),
            description: "Get autocomplete suggestions for multiple queries at once".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "queries": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "List of search queries to get suggestions for"
                    },
                    "location": {
                        "type": "string",
                        "description": "Optional location for localized suggestions"
                    },
                    "gl": {
                        "type": "string",
                        "description": "Optional region code (default: us)"
                    },
                    "hl": {
                        "type": "string",
                        "description": "Optional language code (default: en)"
                    }
                },
                "required": ["queries"]
            }),
            handler: Arc::new(AutocompleteHandler {
                client: client.clone(),
            }),
        });

        registry.register(Tool {
            name: "analyze_serp".to_string(),
            description: "Analyze a search engine results page for a query".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Query whose SERP to analyze"
                    },
                    "gl": { "type": "string", "description": "Region code (default: us)" },
                    "hl": { "type": "string", "description": "Language code (default: en)" },
                    "google_domain": {
                        "type": "string",
                        "description": "Google domain to use (default: google.com)"
                    },
                    "num": {
                        "type": "number",
                        "description": "Number of results to analyze (default: 10)"
                    },
                    "device": {
                        "type": "string",
                        "description": "Device to emulate: desktop or mobile (default: desktop)"
                    },
                    "location": { "type": "string", "description": "Optional location" },
                    "safe": {
                        "type": "string",
                        "description": "Safe search mode: active or off"
                    }
                },
                "required": ["query"]
            }),
            handler: Arc::new(AnalyzeSerpHandler {
                client: client.clone(),
            }),
        });

        registry.register(Tool {
            name: "research_keywords".to_string(),
            description: "Research keywords related to a seed keyword".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "keyword": {
                        "type": "string",
                        "description": "Seed keyword to research"
                    },
                    "language": { "type": "string", "description": "Optional language" },
                    "location": { "type": "string", "description": "Optional location" },
                    "include_questions": {
                        "type": "boolean",
                        "description": "Include question-form keywords",
                        "default": false
                    },
                    "include_related": {
                        "type": "boolean",
                        "description": "Include related searches",
                        "default": false
                    },
                    "include_suggestions": {
                        "type": "boolean",
                        "description": "Include autocomplete suggestions",
                        "default": false
                    }
                },
                "required": ["keyword"]
            }),
            handler: Arc::new(ResearchKeywordsHandler {
                client: client.clone(),
            }),
        });

        registry.register(Tool {
            name: "analyze_competitors".to_string(),
            description: "Analyze competitors of a domain in search results".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "domain": {
                        "type": "string",
                        "description": "Domain to analyze (e.g. 'example.com')"
                    },
                    "keyword": {
                        "type": "string",
                        "description": "Optional keyword to focus the analysis on"
                    },
                    "include_features": {
                        "type": "boolean",
                        "description": "Include SERP feature analysis"
                    },
                    "num_results": {
                        "type": "number",
                        "description": "Number of competitors to analyze",
                        "minimum": 1,
                        "maximum": 100
                    }
                },
                "required": ["domain"]
            }),
            handler: Arc::new(AnalyzeCompetitorsHandler {
                client: client.clone(),
            }),
        });

        registry.register(Tool {
            name: "_health".to_string(),
            description: "Health check for the Serper connection".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
            handler: Arc::new(HealthHandler { client }),
        });

        registry
    }

    /// Register a tool, replacing any previous tool with the same name
    pub fn register(&mut self, tool: Tool) {
        if !self.tools.contains_key(&tool.name) {
            self.order.push(tool.name.clone());
        }
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// All tools in registration order
    pub fn all(&self) -> impl Iterator<Item = &Tool> {
        self.order.iter().filter_map(|name| self.tools.get(name))
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, String> {
        let tool = self
            .get(name)
            .ok_or_else(|| format!("tool not found: {}", name))?;
        tool.handler.execute(args).await
    }

    /// Tool descriptors in the shape clients expect:
    /// `{name, description, parameters}`.
    pub fn descriptors(&self) -> Vec<Value> {
        self.all()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.input_schema,
                })
            })
            .collect()
    }
}

/// Input schema for a SERP vertical.
///
/// All verticals share a base parameter set; web search additionally exposes
/// the advanced operators, scholar the year range, patents the patent office.
fn search_schema(vertical: SearchVertical) -> Value {
    let mut properties = serde_json::Map::new();

    properties.insert(
        "q".to_string(),
        json!({
            "type": "string",
            "description": "Search query string (e.g. 'artificial intelligence')"
        }),
    );
    properties.insert(
        "gl".to_string(),
        json!({
            "type": "string",
            "description": "Region code in ISO 3166-1 alpha-2 format (e.g. 'us', 'br')"
        }),
    );
    properties.insert(
        "hl".to_string(),
        json!({
            "type": "string",
            "description": "Language code in ISO 639-1 format (e.g. 'en', 'pt')"
        }),
    );
    properties.insert(
        "location".to_string(),
        json!({
            "type": "string",
            "description": "Optional location for localized results (e.g. 'Sao Paulo, Brazil')"
        }),
    );
    properties.insert(
        "num".to_string(),
        json!({
            "type": "number",
            "description": "Number of results to return (default: 10)"
        }),
    );
    properties.insert(
        "page".to_string(),
        json!({
            "type": "number",
            "description": "Page of results to return (default: 1)"
        }),
    );
    properties.insert(
        "tbs".to_string(),
        json!({
            "type": "string",
            "description": "Time filter: 'qdr:h' (hour), 'qdr:d' (day), 'qdr:w' (week), \
                            'qdr:m' (month), 'qdr:y' (year)"
        }),
    );
    properties.insert(
        "autocorrect".to_string(),
        json!({
            "type": "boolean",
            "description": "Whether to autocorrect spelling in the query",
            "default": true
        }),
    );

    match vertical {
        SearchVertical::Web => {
            let operators: &[(&str, &str)] = &[
                ("site", "Limit results to a specific domain (e.g. 'github.com')"),
                ("filetype", "Limit to specific file types (e.g. 'pdf', 'doc')"),
                ("inurl", "Pages containing a word in the URL"),
                ("intitle", "Pages containing a word in the title"),
                ("related", "Sites similar to a domain"),
                ("cache", "Google's cached version of a URL"),
                ("before", "Results dated before (YYYY-MM-DD)"),
                ("after", "Results dated after (YYYY-MM-DD)"),
                ("exact", "Exact phrase match"),
                ("exclude", "Comma-separated terms to exclude"),
                ("or", "Comma-separated alternative terms"),
            ];
            for (name, description) in operators {
                properties.insert(
                    name.to_string(),
                    json!({ "type": "string", "description": description }),
                );
            }
        }
        SearchVertical::Scholar => {
            properties.insert(
                "year_min".to_string(),
                json!({
                    "type": "number",
                    "description": "Earliest publication year to include"
                }),
            );
            properties.insert(
                "year_max".to_string(),
                json!({
                    "type": "number",
                    "description": "Latest publication year to include"
                }),
            );
        }
        SearchVertical::Patents => {
            properties.insert(
                "patent_office".to_string(),
                json!({
                    "type": "string",
                    "description": "Patent office to search (e.g. 'US', 'EP')"
                }),
            );
        }
        _ => {}
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": ["q", "gl", "hl"]
    })
}
