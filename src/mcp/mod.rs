//! MCP front-ends for the Serper tool set.
//!
//! Two transports are provided: a stdio JSON-RPC server built on `pmcp`
//! ([`server`]) and a session-oriented SSE service built on `axum` ([`sse`]).
//! Both share the same [`tools::ToolRegistry`].

pub mod handlers;
pub mod server;
pub mod sse;
pub mod tools;

pub use server::McpServer;
pub use sse::SseServer;
pub use tools::{Tool, ToolHandler, ToolRegistry};
