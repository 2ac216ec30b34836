//! Collection statistics resource.

use crate::mcp::context::ToolContext;
use crate::mcp::protocol::{McpError, ResourceContent};
use crate::mcp::registry::{McpRegistry, RegisteredResource, ResourceBuilder, ResourceResult};

pub const COLLECTION_STATS_URI: &str = "collection://stats";

pub fn register_resources(registry: &mut McpRegistry) {
    registry.register_resource(collection_stats_resource());
}

// ============================================================================
// collection://stats
// ============================================================================

fn collection_stats_resource() -> RegisteredResource {
    ResourceBuilder::new(COLLECTION_STATS_URI, "Collection Statistics")
        .description("Total movies, average rating and movie count per genre")
        .mime_type("application/json")
        .build(collection_stats_handler)
}

async fn collection_stats_handler(ctx: ToolContext, uri: String) -> ResourceResult {
    let stats = ctx
        .run(|store| store.collection_stats())
        .await?
        .map_err(|e| McpError::ToolExecutionFailed(e.to_string()))?;

    let text =
        serde_json::to_string_pretty(&stats).map_err(|e| McpError::InternalError(e.to_string()))?;

    Ok(vec![ResourceContent {
        uri,
        mime_type: Some("application/json".to_string()),
        text,
    }])
}
