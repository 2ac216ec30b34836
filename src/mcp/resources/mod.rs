//! MCP Resources
//!
//! Read-only views over the catalog.

pub mod stats;

use super::registry::McpRegistry;

/// Register all resources with the registry
pub fn register_all_resources(registry: &mut McpRegistry) {
    stats::register_resources(registry);
}
