//! Movie Catalog MCP Server Library
//!
//! A SQLite movie catalog exposed to tool-calling agents over MCP.

pub mod catalog_store;
pub mod config;
pub mod mcp;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use catalog_store::{MovieStore, SqliteMovieStore};
pub use config::{AppConfig, CliConfig, FileConfig, Transport};
pub use server::{run_server, RequestsLoggingLevel, ServerConfig};
