//! MCP Tools

pub mod movies;

use super::registry::McpRegistry;

/// Register all tools with the registry
pub fn register_all_tools(registry: &mut McpRegistry) {
    movies::register_tools(registry);
}
