//! MCP message dispatch and transports.
//!
//! `McpSession::handle_message` is transport-agnostic: it takes one JSON-RPC
//! text message and returns the response to send, if any. The stdio and
//! WebSocket transports only move text in and out of a session.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use super::context::ToolContext;
use super::protocol::{
    methods, InitializeParams, InitializeResult, McpError, McpRequest, McpResponse, PingResult,
    PromptsCapability, PromptsGetParams, PromptsGetResult, PromptsListResult,
    ResourcesCapability, ResourcesListResult, ResourcesReadParams, ResourcesReadResult,
    ServerCapabilities, ServerInfo, ToolsCallParams, ToolsCapability, ToolsListResult,
    JSONRPC_VERSION, MCP_PROTOCOL_VERSION,
};
use super::registry::{McpRegistry, ToolCategory};
use crate::catalog_store::MovieStore;

pub const SERVER_NAME: &str = "movie-catalog-mcp";

/// State shared across MCP connections
pub struct McpState {
    pub registry: Arc<McpRegistry>,
    pub context: ToolContext,
}

pub type GuardedMcpState = Arc<McpState>;

/// Per-connection protocol state.
#[derive(Default)]
pub struct McpSession {
    initialized: bool,
}

impl McpSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Handle a single MCP message
    pub async fn handle_message(&mut self, text: &str, state: &McpState) -> Option<McpResponse> {
        let value: Value = match serde_json::from_str(text) {
            Ok(value) => value,
            Err(e) => {
                return Some(McpResponse::error(
                    None,
                    McpError::ParseError(e.to_string()),
                ));
            }
        };

        let request: McpRequest = match serde_json::from_value(value) {
            Ok(req) => req,
            Err(e) => {
                return Some(McpResponse::error(
                    None,
                    McpError::InvalidRequest(e.to_string()),
                ));
            }
        };

        if request.jsonrpc != JSONRPC_VERSION {
            return Some(McpResponse::error(
                request.id,
                McpError::InvalidRequest(format!("Unsupported jsonrpc version {}", request.jsonrpc)),
            ));
        }

        let request_id = match request.id.clone() {
            Some(id) => id,
            None => {
                debug!("MCP notification {}", request.method);
                return None;
            }
        };

        let result = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(&request),
            methods::PING => to_result(PingResult {}),
            methods::SHUTDOWN => {
                // Client is disconnecting gracefully
                return None;
            }
            _ if !self.initialized => Err(McpError::InvalidRequest("Not initialized".to_string())),
            methods::TOOLS_LIST => to_result(ToolsListResult {
                tools: state.registry.list_tools(),
            }),
            methods::TOOLS_CALL => handle_tools_call(&request, state).await,
            methods::RESOURCES_LIST => to_result(ResourcesListResult {
                resources: state.registry.list_resources(),
            }),
            methods::RESOURCES_READ => handle_resources_read(&request, state).await,
            methods::PROMPTS_LIST => to_result(PromptsListResult {
                prompts: state.registry.list_prompts(),
            }),
            methods::PROMPTS_GET => handle_prompts_get(&request, state),
            other => Err(McpError::MethodNotFound(other.to_string())),
        };

        Some(match result {
            Ok(value) => McpResponse::success(request_id, value),
            Err(error) => {
                debug!("MCP {} failed: {}", request.method, error.message());
                McpResponse::error(Some(request_id), error)
            }
        })
    }

    fn handle_initialize(&mut self, request: &McpRequest) -> Result<Value, McpError> {
        let params: Option<InitializeParams> = parse_optional_params(request)?;
        if let Some(params) = params {
            info!(
                "MCP client {} {} (protocol {})",
                params.client_info.name, params.client_info.version, params.protocol_version
            );
        }

        self.initialized = true;

        to_result(InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: None }),
                resources: Some(ResourcesCapability {
                    subscribe: Some(false),
                    list_changed: None,
                }),
                prompts: Some(PromptsCapability { list_changed: None }),
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: super::context::server_version(),
            },
        })
    }
}

fn to_result<T: serde::Serialize>(value: T) -> Result<Value, McpError> {
    serde_json::to_value(value).map_err(|e| McpError::InternalError(e.to_string()))
}

fn parse_optional_params<T: DeserializeOwned>(request: &McpRequest) -> Result<Option<T>, McpError> {
    request
        .params
        .clone()
        .filter(|p| !p.is_null())
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn parse_params<T: DeserializeOwned>(request: &McpRequest) -> Result<T, McpError> {
    parse_optional_params(request)?
        .ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))
}

async fn handle_tools_call(request: &McpRequest, state: &McpState) -> Result<Value, McpError> {
    let params: ToolsCallParams = parse_params(request)?;

    let tool = state
        .registry
        .get_tool(&params.name)
        .ok_or_else(|| McpError::MethodNotFound(format!("Unknown tool: {}", params.name)))?;

    match tool.category {
        ToolCategory::Write => info!("MCP tool call {}", tool.name),
        ToolCategory::Read => debug!("MCP tool call {}", tool.name),
    }

    let arguments = params
        .arguments
        .filter(|a| !a.is_null())
        .unwrap_or_else(|| serde_json::json!({}));
    let result = (tool.handler)(state.context.clone(), arguments).await?;

    to_result(result)
}

async fn handle_resources_read(request: &McpRequest, state: &McpState) -> Result<Value, McpError> {
    let params: ResourcesReadParams = parse_params(request)?;

    let resource = state
        .registry
        .find_resource(&params.uri)
        .ok_or_else(|| McpError::ResourceNotFound(params.uri.clone()))?;

    let contents = (resource.handler)(state.context.clone(), params.uri).await?;

    to_result(ResourcesReadResult { contents })
}

fn handle_prompts_get(request: &McpRequest, state: &McpState) -> Result<Value, McpError> {
    let params: PromptsGetParams = parse_params(request)?;

    let prompt = state
        .registry
        .get_prompt(&params.name)
        .ok_or_else(|| McpError::InvalidParams(format!("Unknown prompt: {}", params.name)))?;

    to_result(PromptsGetResult {
        description: prompt.description.clone(),
        messages: prompt.messages(),
    })
}

/// Create the MCP state with registered tools, resources and prompts
pub fn create_mcp_state(store: Arc<dyn MovieStore>) -> McpState {
    let mut registry = McpRegistry::new();

    super::tools::register_all_tools(&mut registry);
    super::resources::register_all_resources(&mut registry);
    super::prompts::register_all_prompts(&mut registry);

    info!(
        "MCP registry initialized with {} tools, {} resources and {} prompts",
        registry.tool_count(),
        registry.resource_count(),
        registry.prompt_count()
    );

    McpState {
        registry: Arc::new(registry),
        context: ToolContext::new(store),
    }
}

// ============================================================================
// stdio transport
// ============================================================================

/// Serve one MCP session over newline-delimited JSON until the input ends.
pub async fn serve_lines<R, W>(reader: R, mut writer: W, state: &McpState) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut session = McpSession::new();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(response) = session.handle_message(line, state).await {
            match serde_json::to_string(&response) {
                Ok(json) => {
                    writer.write_all(json.as_bytes()).await?;
                    writer.write_all(b"\n").await?;
                    writer.flush().await?;
                }
                Err(e) => {
                    error!("Failed to serialize MCP response: {}", e);
                }
            }
        }
    }

    debug!("MCP input closed");
    Ok(())
}

pub async fn serve_stdio(state: Arc<McpState>) -> anyhow::Result<()> {
    info!("Serving MCP over stdio");
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve_lines(stdin, tokio::io::stdout(), &state).await
}

// ============================================================================
// WebSocket transport
// ============================================================================

/// WebSocket upgrade handler for MCP
pub async fn mcp_handler(ws: WebSocketUpgrade, State(mcp_state): State<GuardedMcpState>) -> Response {
    debug!("MCP WebSocket upgrade");
    ws.on_upgrade(move |socket| handle_mcp_socket(socket, mcp_state))
}

/// Handle an established MCP WebSocket connection
async fn handle_mcp_socket(socket: WebSocket, mcp_state: GuardedMcpState) {
    info!("MCP WebSocket connection established");

    let (mut ws_sink, mut ws_stream) = socket.split();
    let mut session = McpSession::new();

    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                let response = session.handle_message(&text, &mcp_state).await;

                if let Some(response) = response {
                    match serde_json::to_string(&response) {
                        Ok(json) => {
                            if ws_sink.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Failed to serialize MCP response: {}", e);
                        }
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!("Received binary MCP frame, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // Axum/tungstenite handles pong automatically
            }
            Ok(Message::Close(_)) => {
                debug!("Received close frame");
                break;
            }
            Err(e) => {
                debug!("WebSocket error: {}", e);
                break;
            }
        }
    }

    info!("MCP WebSocket connection closed");
}
