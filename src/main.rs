use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_catalog_server::config::{AppConfig, CliConfig, FileConfig, Transport, DEFAULT_PORT};
use movie_catalog_server::mcp::{create_mcp_state, serve_stdio};
use movie_catalog_server::server::{run_server, RequestsLoggingLevel, ServerConfig};
use movie_catalog_server::SqliteMovieStore;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[command(version, about = "Movie catalog served over the Model Context Protocol")]
struct CliArgs {
    /// Path to the SQLite movie database file. Defaults to
    /// <data dir>/MovieDatabaseMCP/movies.db.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// How MCP clients connect.
    #[clap(long, value_enum, default_value_t = Transport::Stdio)]
    pub transport: Transport,

    /// The port to listen on with the websocket transport.
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Do not insert the demo movies when creating a new database.
    #[clap(long)]
    pub no_seed: bool,

    /// The level of logging to perform on each HTTP request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Path to a TOML config file. Its values override the CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // stdout belongs to the stdio transport, logs go to stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;

    let cli_config = CliConfig {
        db_path: cli_args.db_path,
        transport: cli_args.transport,
        port: cli_args.port,
        seed_demo_data: !cli_args.no_seed,
        logging_level: cli_args.logging_level,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    info!("Opening movie database at {:?}...", config.db_path);
    let store = Arc::new(
        SqliteMovieStore::open(&config.db_path, config.seed_demo_data)
            .with_context(|| format!("Failed to open movie database {:?}", config.db_path))?,
    );

    let mcp_state = Arc::new(create_mcp_state(store));

    match config.transport {
        Transport::Stdio => serve_stdio(mcp_state).await,
        Transport::Websocket => {
            let server_config = ServerConfig {
                requests_logging_level: config.logging_level,
                port: config.port,
            };
            run_server(server_config, mcp_state).await
        }
    }
}
