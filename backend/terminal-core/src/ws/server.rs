//! WebSocket server implementation.
//!
//! Every accepted connection gets its own task and its own
//! [`ServerCodec`]. Frames are handled one at a time, so responses leave
//! in the order their requests arrived. Hardware delays stall only the
//! connection that issued the call.

use crate::config::ServerConfig;
use crate::error::codec::CodecError;
use crate::error::ws::WsError;
use crate::jsonrpc::{RpcError, ServerCodec};
use crate::rpc::RpcAdapter;
use crate::ws::handle::WsServerHandle;

use common::ErrorLocation;

use std::net::SocketAddr;
use std::panic::Location;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn as TokioSpawn;
use tokio::sync::oneshot;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use uuid::Uuid;

/// Starts the WebSocket server described by `config`.
///
/// Binds `bind_address:port` and spawns a background task that accepts
/// connections until the returned handle is shut down or dropped.
///
/// # Errors
///
/// Returns [`WsError::Io`] if the address cannot be bound, or
/// [`WsError::Validation`] if the configured path is not absolute.
pub async fn start_ws_server(
    config: &ServerConfig,
    adapter: Arc<RpcAdapter>,
) -> Result<WsServerHandle, WsError> {
    if !config.path.starts_with('/') {
        return Err(WsError::Validation {
            message: format!("WebSocket path must start with '/': {}", config.path),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    let listener = TcpListener::bind(config.socket_address()).await?;
    let local_addr = listener.local_addr()?;
    let path: Arc<str> = Arc::from(config.path.as_str());

    info!("WebSocket server listening on ws://{local_addr}{path}");

    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let accept_task = TokioSpawn(async move {
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("WebSocket accept loop on {local_addr} shutting down");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        let connection = ConnectionContext {
                            id: Uuid::new_v4(),
                            addr,
                            path: path.clone(),
                            adapter: adapter.clone(),
                        };
                        TokioSpawn(async move {
                            let id = connection.id;
                            if let Err(e) = handle_connection(stream, connection).await {
                                error!("Connection {id} ended with error: {e}");
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {e}");
                    }
                },
            }
        }
    });

    Ok(WsServerHandle {
        local_addr,
        shutdown: Some(shutdown_tx),
        accept_task: Some(accept_task),
    })
}

struct ConnectionContext {
    id: Uuid,
    addr: SocketAddr,
    path: Arc<str>,
    adapter: Arc<RpcAdapter>,
}

/// Handles a single WebSocket connection.
///
/// 1. Performs the handshake, refusing any path but the configured one
/// 2. Decodes each text frame, dispatches it, writes the reply
/// 3. Returns on close or end of stream
///
/// # Errors
///
/// - [`WsError::Handshake`] - upgrade failed or wrong path
/// - [`WsError::Send`] - reply could not be written
/// - [`WsError::Read`] - frame could not be read
async fn handle_connection(
    stream: TcpStream,
    connection: ConnectionContext,
) -> Result<(), WsError> {
    let ConnectionContext {
        id,
        addr,
        path,
        adapter,
    } = connection;

    info!("Client {addr} connecting (connection {id})");

    let expected_path = path.clone();
    let check_path = move |request: &Request, response: Response| {
        if request.uri().path() == &*expected_path {
            Ok(response)
        } else {
            let mut refusal = ErrorResponse::new(Some(format!(
                "no endpoint at {}",
                request.uri().path()
            )));
            *refusal.status_mut() = StatusCode::NOT_FOUND;
            Err(refusal)
        }
    };

    let ws_stream = accept_hdr_async(stream, check_path)
        .await
        .map_err(|e| WsError::Handshake {
            message: format!("WebSocket handshake with {addr} failed: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let (mut write, mut read) = ws_stream.split();
    let codec = ServerCodec::new();

    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let reply = dispatch(&codec, &adapter, text.as_str()).await;
                write
                    .send(Message::Text(reply.into()))
                    .await
                    .map_err(|e| WsError::Send {
                        message: format!("Failed to send reply to {addr}: {e}"),
                        location: ErrorLocation::from(Location::caller()),
                    })?;
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => {
                warn!("Client {addr} sent a binary frame, ignoring");
            }
            Ok(_) => {}
            Err(e) => {
                return Err(WsError::Read {
                    message: format!("Error reading message from {addr}: {e}"),
                    location: ErrorLocation::from(Location::caller()),
                });
            }
        }
    }

    info!("Client {addr} disconnected (connection {id})");
    Ok(())
}

/// Turns one request frame into one response frame.
async fn dispatch(codec: &ServerCodec, adapter: &RpcAdapter, text: &str) -> String {
    match codec.decode_request(text) {
        Ok(request) => {
            debug!("-> {} (seq {})", request.wire_method, request.seq);
            let result = adapter.call(&request.method, request.params).await;
            if let Err(ref e) = result {
                debug!("<- {} failed: {e}", request.wire_method);
            }
            codec.encode_response(request.seq, result)
        }
        Err(error) => {
            warn!("Rejected frame: {error}");
            let id = match &error {
                CodecError::InvalidRequest { id, .. } => id.clone(),
                CodecError::Parse { .. } => None,
            };
            codec.encode_error(id, RpcError::from(&error))
        }
    }
}
