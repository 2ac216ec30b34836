use anyhow::{Context, Result};
use std::future::Future;
use std::time::{Duration, Instant};

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::{log_requests, state::ServerState, ServerConfig};
use crate::mcp::{mcp_handler, GuardedMcpState};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

pub fn make_app(config: ServerConfig, mcp_state: GuardedMcpState) -> Router {
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        hash: crate::mcp::context::server_version(),
        mcp_state,
    };

    Router::new()
        .route("/", get(home))
        .route("/v1/mcp", get(mcp_handler))
        .layer(middleware::from_fn_with_state(config, log_requests))
        .with_state(state)
}

/// Serve `app` on an already bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Server error")
}

pub async fn run_server(config: ServerConfig, mcp_state: GuardedMcpState) -> Result<()> {
    let port = config.port;
    let app = make_app(config, mcp_state);

    let listener = TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Serving MCP over WebSocket at ws://127.0.0.1:{}/v1/mcp", port);

    serve(listener, app, shutdown_on(tokio::signal::ctrl_c())).await
}

/// Resolves once `signal` fires. If the handler could not be installed the
/// server keeps running until the process is killed.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutting down"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
