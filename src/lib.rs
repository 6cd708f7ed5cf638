//! # Serper MCP
//!
//! A Model Context Protocol (MCP) server and CLI exposing the Serper search API
//! (Google SERP as a service) as callable tools.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Typed request payloads for the Serper endpoints
//! - [`serper`]: HTTP client for `google.serper.dev`
//! - [`mcp`]: Tool registry, MCP stdio server, and SSE session server
//! - [`utils`]: HTTP client wrapper, retry logic, input validation
//! - [`config`]: Configuration management

pub mod config;
pub mod mcp;
pub mod models;
pub mod serper;
pub mod utils;

// Re-export commonly used types
pub use models::{ScrapeRequest, SearchRequest};
pub use serper::{SerperClient, SerperError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
