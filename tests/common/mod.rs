//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{McpClient, TestServer};
//!
//! #[tokio::test]
//! async fn test_count() {
//!     let server = TestServer::spawn().await;
//!     let mut client = McpClient::connect_initialized(&server).await;
//!
//!     let count = client.call_tool_json("count_movies", serde_json::json!({})).await;
//!     assert_eq!(count, 4);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::McpClient;
pub use constants::*;
pub use server::TestServer;

#[allow(unused_imports)]
pub use fixtures::create_legacy_db;
