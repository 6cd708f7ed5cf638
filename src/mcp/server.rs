//! MCP server implementation using pmcp (Pragmatic AI's rust-mcp-sdk).
//!
//! Exposes the tool registry over stdio as JSON-RPC for MCP clients such as
//! Claude Desktop.

use async_trait::async_trait;
use pmcp::{Error, RequestHandlerExtra, Server, ServerCapabilities, ToolHandler, ToolInfo};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::mcp::tools::ToolRegistry;

/// The MCP stdio server for the Serper tool set
#[derive(Debug, Clone)]
pub struct McpServer {
    server: Arc<Mutex<Server>>,
}

impl McpServer {
    /// Create a new MCP server wrapping the given tool registry
    pub fn new(tools: &ToolRegistry) -> Result<Self, pmcp::Error> {
        let server = Self::build_server_impl(tools)?;
        Ok(Self {
            server: Arc::new(Mutex::new(server)),
        })
    }

    /// Build the MCP server with tool handlers (internal implementation)
    fn build_server_impl(tools: &ToolRegistry) -> Result<Server, pmcp::Error> {
        let mut builder = Server::builder()
            .name("serper-mcp")
            .version(env!("CARGO_PKG_VERSION"))
            .capabilities(ServerCapabilities::default());

        for tool in tools.all() {
            let tool_handler = ToolWrapper {
                name: tool.name.clone(),
                description: Some(tool.description.clone()),
                input_schema: tool.input_schema.clone(),
                handler: tool.handler.clone(),
            };
            builder = builder.tool(tool_handler.name.clone(), tool_handler);
        }

        builder.build()
    }

    /// Run the server in stdio mode
    pub async fn run(self) -> Result<(), pmcp::Error> {
        tracing::info!("Starting MCP server in stdio mode");

        // run_stdio() takes ownership, so the Server has to be extracted from
        // the Arc<Mutex>. Taking self by value keeps the refcount at one.
        let server = Arc::try_unwrap(self.server)
            .map_err(|_| Error::internal("Cannot unwrap Arc - multiple references exist"))?
            .into_inner();

        tracing::info!("MCP server initialized");

        server.run_stdio().await
    }
}

/// Wrapper for adapting a registry tool to pmcp's ToolHandler
#[derive(Clone)]
struct ToolWrapper {
    name: String,
    description: Option<String>,
    input_schema: Value,
    handler: Arc<dyn crate::mcp::tools::ToolHandler>,
}

#[async_trait]
impl ToolHandler for ToolWrapper {
    async fn handle(&self, args: Value, _extra: RequestHandlerExtra) -> Result<Value, Error> {
        self.handler
            .execute(args)
            .await
            .map_err(|e| Error::internal(&e))
    }

    fn metadata(&self) -> Option<ToolInfo> {
        Some(ToolInfo::new(
            self.name.clone(),
            self.description.clone(),
            self.input_schema.clone(),
        ))
    }
}
