//! MCP Tool Execution Context
//!
//! Gives tool, resource and prompt handlers access to the catalog.

use std::sync::Arc;

use crate::catalog_store::{CatalogError, CatalogResult, MovieStore};

use super::protocol::{McpError, ToolsCallResult};
use super::registry::ToolResult;

#[derive(Clone)]
pub struct ToolContext {
    pub store: Arc<dyn MovieStore>,
}

impl ToolContext {
    pub fn new(store: Arc<dyn MovieStore>) -> Self {
        Self { store }
    }

    /// Runs a blocking catalog action off the async runtime. The outer
    /// error is a failure of the worker task itself.
    pub async fn run<T, F>(&self, action: F) -> Result<CatalogResult<T>, McpError>
    where
        T: Send + 'static,
        F: FnOnce(&dyn MovieStore) -> CatalogResult<T> + Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || action(store.as_ref()))
            .await
            .map_err(|e| McpError::InternalError(format!("Catalog task failed: {}", e)))
    }
}

/// Crate version, suffixed with the commit hash when it was built from git.
pub fn server_version() -> String {
    version_string(env!("CARGO_PKG_VERSION"), option_env!("GIT_HASH"))
}

fn version_string(version: &str, git_hash: Option<&str>) -> String {
    match git_hash {
        Some(hash) => format!("{}-{}", version, hash),
        None => version.to_string(),
    }
}

/// Maps a catalog failure onto a tool result. Missing movies and rejected
/// input are reported to the agent as tool errors; storage failures become
/// protocol errors.
pub fn catalog_error_to_tool_result(err: CatalogError) -> ToolResult {
    match err {
        CatalogError::NotFound(msg) | CatalogError::Validation(msg) => {
            Ok(ToolsCallResult::error(msg))
        }
        CatalogError::Storage(e) => Err(McpError::ToolExecutionFailed(e.to_string())),
    }
}
