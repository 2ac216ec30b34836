//! Minimal MCP client over WebSocket

#![allow(dead_code)]

use super::constants::RESPONSE_TIMEOUT_MS;
use super::server::TestServer;
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

pub struct McpClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: i64,
}

impl McpClient {
    pub async fn connect(server: &TestServer) -> Self {
        let (ws, _) = connect_async(server.mcp_url.as_str())
            .await
            .expect("Failed to connect to MCP WebSocket");
        Self { ws, next_id: 1 }
    }

    /// Connects and completes the initialize handshake
    pub async fn connect_initialized(server: &TestServer) -> Self {
        let mut client = Self::connect(server).await;
        let response = client
            .request(
                "initialize",
                Some(json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": { "name": "e2e-tests", "version": "1.0" }
                })),
            )
            .await;
        assert!(response.get("error").is_none(), "initialize failed: {}", response);
        client
            .notify("notifications/initialized", None)
            .await;
        client
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.ws
            .send(Message::Text(text.into()))
            .await
            .expect("Failed to send message");
    }

    /// Waits for the next text frame and parses it
    pub async fn receive(&mut self) -> Value {
        timeout(Duration::from_millis(RESPONSE_TIMEOUT_MS), async {
            while let Some(msg) = self.ws.next().await {
                if let Message::Text(text) = msg.expect("WebSocket error") {
                    return serde_json::from_str::<Value>(&text).expect("Invalid JSON response");
                }
            }
            panic!("WebSocket closed before a response arrived");
        })
        .await
        .expect("Timed out waiting for MCP response")
    }

    pub async fn request(&mut self, method: &str, params: Option<Value>) -> Value {
        let id = self.next_id;
        self.next_id += 1;

        let mut message = json!({ "jsonrpc": "2.0", "id": id, "method": method });
        if let Some(params) = params {
            message["params"] = params;
        }
        self.send_raw(&message.to_string()).await;

        let response = self.receive().await;
        assert_eq!(response["id"], id, "Response id mismatch: {}", response);
        response
    }

    pub async fn notify(&mut self, method: &str, params: Option<Value>) {
        let mut message = json!({ "jsonrpc": "2.0", "method": method });
        if let Some(params) = params {
            message["params"] = params;
        }
        self.send_raw(&message.to_string()).await;
    }

    /// Calls a tool and returns the raw `tools/call` response
    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Value {
        self.request(
            "tools/call",
            Some(json!({ "name": name, "arguments": arguments })),
        )
        .await
    }

    /// Calls a tool that must succeed and parses its JSON text content
    pub async fn call_tool_json(&mut self, name: &str, arguments: Value) -> Value {
        let response = self.call_tool(name, arguments).await;
        let result = &response["result"];
        assert!(
            result.get("isError").is_none(),
            "Tool {} returned an error: {}",
            name,
            response
        );
        let text = result["content"][0]["text"]
            .as_str()
            .expect("Tool result has no text content");
        serde_json::from_str(text).expect("Tool text is not JSON")
    }

    pub async fn close(mut self) {
        self.ws.close(None).await.ok();
    }
}
