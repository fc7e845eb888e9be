//! WebSocket Handler
//!
//! Handles WebSocket upgrade requests and turns each upgraded socket into
//! connect, event and disconnect notifications for the [`Server`].

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use super::messages::{ClientMessage, ServerMessage};
use super::server::{Server, ServerError};
use super::socket::{SecureSocket, SocketError};
use crate::api::AppState;

/// WebSocket upgrade handler
///
/// This is the entry point for WebSocket connections.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    let server = Arc::clone(&state.server);
    let limit = server.config().transport_limit();
    ws.max_message_size(limit)
        .max_frame_size(limit)
        .on_upgrade(move |socket| handle_socket(socket, server))
}

/// Handle an established WebSocket connection
async fn handle_socket(socket: WebSocket, server: Arc<Server>) {
    let (mut sender, mut receiver) = socket.split();

    // Outbound queue for this connection; drained by the send task
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    let secure_socket = Arc::new(SecureSocket::new(tx));
    let connection_id = secure_socket.id().to_string();

    if let Err(e) = server.on_connection(Arc::clone(&secure_socket)).await {
        tracing::error!(error = %e, "Failed to register WebSocket connection");
        if let Some(frame) = text_frame(&ServerMessage::error(e.to_string())) {
            let _ = sender.send(frame).await;
        }
        let _ = sender.close().await;
        return;
    }

    let conn_id_for_send = connection_id.clone();

    // Task to forward messages from channel to WebSocket
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let Some(frame) = text_frame(&msg) else {
                continue;
            };
            if sender.send(frame).await.is_err() {
                tracing::debug!(
                    connection_id = %conn_id_for_send,
                    "WebSocket send failed, closing connection"
                );
                break;
            }
        }
    });

    let server_for_recv = Arc::clone(&server);
    let socket_for_recv = Arc::clone(&secure_socket);

    // Task to receive messages from WebSocket and dispatch them
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(msg) => {
                    if !handle_ws_message(&server_for_recv, &socket_for_recv, msg).await {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %socket_for_recv.id(),
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }
    });

    // Wait for either task to complete
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    server.on_disconnected(&connection_id).await;
}

/// Encode an envelope as a text frame
fn text_frame(message: &ServerMessage) -> Option<Message> {
    match serde_json::to_string(message) {
        Ok(text) => Some(Message::Text(text)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize message");
            None
        }
    }
}

/// Handle a received WebSocket message
///
/// Returns false if the connection should be closed.
async fn handle_ws_message(server: &Server, socket: &SecureSocket, message: Message) -> bool {
    match message {
        Message::Text(text) => {
            let max_message_bytes = server.config().max_message_bytes;
            if text.len() > max_message_bytes {
                tracing::debug!(
                    connection_id = %socket.id(),
                    size = text.len(),
                    "Oversized client message"
                );
                let _ = socket.emit_error(format!(
                    "Message exceeds {} bytes",
                    max_message_bytes
                ));
                return true;
            }

            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => {
                    dispatch_client_message(server, socket, client_msg).await;
                }
                Err(e) => {
                    tracing::debug!(
                        connection_id = %socket.id(),
                        error = %e,
                        "Invalid client message"
                    );
                    // Keep the connection open
                    let _ = socket.emit_error(format!("Invalid message format: {}", e));
                }
            }
            true
        }
        Message::Binary(_) => {
            let _ = socket.emit_error("Binary messages not supported");
            true
        }
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => true,
        Message::Close(_) => {
            tracing::debug!(connection_id = %socket.id(), "Client requested close");
            false
        }
    }
}

/// Route a parsed client event to the handler a listener attached
async fn dispatch_client_message(server: &Server, socket: &SecureSocket, message: ClientMessage) {
    match server.dispatch(socket.id(), &message.event, message.data).await {
        Ok(()) => {}
        Err(ServerError::Socket(SocketError::UnknownEvent(event))) => {
            tracing::debug!(connection_id = %socket.id(), event = %event, "No listener for event");
            let _ = socket.emit_error(format!("Unknown event: {}", event));
        }
        Err(e) => {
            tracing::warn!(connection_id = %socket.id(), error = %e, "Dispatch failed");
            let _ = socket.emit_error(e.to_string());
        }
    }
}
