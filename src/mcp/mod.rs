//! MCP (Model Context Protocol) Server
//!
//! Exposes the movie catalog to LLM clients as tools, resources and prompts.
//!
//! ## Architecture
//!
//! - Transports: newline-delimited JSON over stdio, or WebSocket at `/v1/mcp`
//! - Tools: one per catalog action
//! - Resources: read-only collection statistics
//! - Prompts: static assistant instructions

pub mod context;
pub mod handler;
pub mod prompts;
pub mod protocol;
pub mod registry;
pub mod resources;
pub mod tools;

pub use handler::{create_mcp_state, mcp_handler, serve_stdio, GuardedMcpState, McpSession, McpState};
pub use protocol::{McpError, McpRequest, McpResponse};
pub use registry::McpRegistry;
