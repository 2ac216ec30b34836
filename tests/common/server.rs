//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own database file.

#![allow(dead_code)]

use movie_catalog_server::mcp::create_mcp_state;
use movie_catalog_server::server::{make_app, serve, RequestsLoggingLevel, ServerConfig};
use movie_catalog_server::SqliteMovieStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// WebSocket URL of the MCP endpoint (e.g., "ws://127.0.0.1:12345/v1/mcp")
    pub mcp_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Database file backing this server
    pub db_path: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_dir: Option<TempDir>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server with a freshly seeded database on a random port
    pub async fn spawn() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("movies.db");
        let mut server = Self::spawn_with_db(&db_path, true).await;
        server._temp_dir = Some(temp_dir);
        server
    }

    /// Spawns a server on an existing (or new) database file. The caller
    /// owns the file's directory.
    pub async fn spawn_with_db(db_path: &Path, seed_demo_data: bool) -> Self {
        let store = SqliteMovieStore::open(db_path, seed_demo_data)
            .expect("Failed to open movie store");
        let mcp_state = Arc::new(create_mcp_state(Arc::new(store)));

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
        };
        let app = make_app(config, mcp_state);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        // The listener is already bound, so connections queue until the
        // task starts accepting
        tokio::spawn(async move {
            serve(listener, app, async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Server failed");
        });

        Self {
            mcp_url: format!("ws://127.0.0.1:{}/v1/mcp", port),
            port,
            db_path: db_path.to_path_buf(),
            _temp_dir: None,
            _shutdown_tx: Some(shutdown_tx),
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
