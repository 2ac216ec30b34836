mod file_config;

pub use file_config::FileConfig;

use crate::server::RequestsLoggingLevel;
use anyhow::{anyhow, Result};
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 3005;
const DATA_DIR_NAME: &str = "MovieDatabaseMCP";
const DB_FILE_NAME: &str = "movies.db";

/// How MCP messages reach the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Transport {
    /// Newline-delimited JSON-RPC on stdin/stdout
    #[default]
    Stdio,
    /// JSON-RPC text frames on a WebSocket at /v1/mcp
    Websocket,
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Stdio => write!(f, "stdio"),
            Transport::Websocket => write!(f, "websocket"),
        }
    }
}

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub transport: Transport,
    pub port: u16,
    pub seed_demo_data: bool,
    pub logging_level: RequestsLoggingLevel,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            transport: Transport::default(),
            port: DEFAULT_PORT,
            seed_demo_data: true,
            logging_level: RequestsLoggingLevel::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub transport: Transport,
    pub port: u16,
    pub seed_demo_data: bool,
    pub logging_level: RequestsLoggingLevel,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = match file.db_path.map(PathBuf::from).or_else(|| cli.db_path.clone()) {
            Some(path) => path,
            None => default_db_path()?,
        };
        if db_path.is_dir() {
            return Err(anyhow!("db_path points to a directory: {:?}", db_path));
        }

        let transport = match file.transport {
            Some(s) => Transport::from_str(&s, true)
                .map_err(|_| anyhow!("Invalid transport in config file: {}", s))?,
            None => cli.transport,
        };

        let port = file.port.unwrap_or(cli.port);
        let seed_demo_data = file.seed_demo_data.unwrap_or(cli.seed_demo_data);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        Ok(Self {
            db_path,
            transport,
            port,
            seed_demo_data,
            logging_level,
        })
    }
}

/// `<platform data dir>/MovieDatabaseMCP/movies.db`
pub fn default_db_path() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(DATA_DIR_NAME).join(DB_FILE_NAME))
        .ok_or_else(|| {
            anyhow!("Could not determine the platform data directory, pass --db-path instead")
        })
}

/// Parses a logging level string into RequestsLoggingLevel.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
