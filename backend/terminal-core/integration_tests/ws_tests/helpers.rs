//! Test helpers for WebSocket integration tests.
//!
//! - Starting a server on an ephemeral port with the in-memory backend
//! - Connecting to it
//! - Sending and receiving JSONRPC frames

use terminal_core::WS_PATH;
use terminal_core::backend::mock::MockBackend;
use terminal_core::config::ServerConfig;
use terminal_core::controller::Controller;
use terminal_core::rpc::RpcAdapter;
use terminal_core::ws::{WsServerHandle, start_ws_server};

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test helper: Start a server on 127.0.0.1:0 with zero hardware delay.
pub async fn start_test_server() -> (WsServerHandle, Arc<RpcAdapter>) {
    let controller = Arc::new(Controller::new(Arc::new(MockBackend::new())));
    controller.set_hardware_business_mult(0.0);
    let adapter = Arc::new(RpcAdapter::new(controller));

    let config = ServerConfig {
        bind_address: String::from("127.0.0.1"),
        port: 0,
        ..ServerConfig::default()
    };

    let handle = start_ws_server(&config, adapter.clone())
        .await
        .expect("Failed to start WebSocket server");
    (handle, adapter)
}

/// Test helper: Connect to the RPC endpoint.
pub async fn connect_to_server(addr: SocketAddr) -> WsClient {
    let url = format!("ws://{addr}{WS_PATH}");
    let (ws_stream, _) = connect_async(&url)
        .await
        .expect("Failed to connect to WebSocket server");
    ws_stream
}

/// Test helper: Send a raw text frame.
pub async fn send_text(ws: &mut WsClient, text: &str) {
    ws.send(Message::Text(text.to_string().into()))
        .await
        .expect("Failed to send message");
}

/// Test helper: Send a JSONRPC request.
pub async fn send_request(ws: &mut WsClient, id: Value, method: &str, params: Value) {
    let frame = serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    });
    send_text(ws, &frame.to_string()).await;
}

/// Test helper: Receive the next frame as JSON.
pub async fn receive_json(ws: &mut WsClient) -> Value {
    let msg = ws
        .next()
        .await
        .expect("No message received")
        .expect("Error receiving message");

    let text = msg.to_text().expect("Expected a text frame");
    serde_json::from_str(text).expect("Response is not JSON")
}

/// Test helper: Send a request and wait for its response.
pub async fn call(ws: &mut WsClient, id: Value, method: &str, params: Value) -> Value {
    send_request(ws, id, method, params).await;
    receive_json(ws).await
}
