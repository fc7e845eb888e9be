//! Secure Socket
//!
//! Wraps the outbound half of a transport connection together with the
//! per-event handlers listeners attach to it. Clients can only trigger
//! handlers that a registered listener explicitly attached; lifecycle event
//! names are never exposed to them.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::{ServerMessage, SocketEvent};

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

/// Handler attached to a socket for a single event name
pub type EventHandler = Arc<dyn Fn(&SecureSocket, Value) + Send + Sync>;

/// A live, wrapped transport connection
pub struct SecureSocket {
    id: ConnectionId,
    connected_at: DateTime<Utc>,
    sender: mpsc::UnboundedSender<ServerMessage>,
    handlers: RwLock<HashMap<String, EventHandler>>,
}

impl SecureSocket {
    /// Wrap the outbound channel of a new transport connection
    pub fn new(sender: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            connected_at: Utc::now(),
            sender,
            handlers: RwLock::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.connected_at
    }

    /// Tell the client its connection identifier
    pub fn initialize(&self) -> Result<(), SocketError> {
        self.send(ServerMessage::connected(&self.id))
    }

    /// Attach a handler for an event sent by the client
    ///
    /// A later call for the same event replaces the earlier handler.
    pub fn on<F>(&self, event: &str, handler: F) -> Result<(), SocketError>
    where
        F: Fn(&SecureSocket, Value) + Send + Sync + 'static,
    {
        if SocketEvent::is_reserved(event) {
            return Err(SocketError::ReservedEvent(event.to_string()));
        }

        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(event.to_string(), Arc::new(handler));

        tracing::trace!(connection_id = %self.id, event = %event, "Handler attached");
        Ok(())
    }

    /// Check whether a handler is attached for an event
    pub fn has_handler(&self, event: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(event)
    }

    /// Run the handler attached for `event`
    pub fn handle(&self, event: &str, data: Value) -> Result<(), SocketError> {
        // The guard is released before the handler runs so it may call `on`.
        let handler = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event)
            .cloned()
            .ok_or_else(|| SocketError::UnknownEvent(event.to_string()))?;

        handler(self, data);
        Ok(())
    }

    /// Queue an event for delivery to the client
    pub fn emit(&self, event: &str, data: Value) -> Result<(), SocketError> {
        self.send(ServerMessage::new(event, data))
    }

    /// Queue an error envelope for delivery to the client
    pub fn emit_error(&self, message: impl Into<String>) -> Result<(), SocketError> {
        self.send(ServerMessage::error(message))
    }

    /// Whether the outbound half of the connection is gone
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn send(&self, message: ServerMessage) -> Result<(), SocketError> {
        self.sender.send(message).map_err(|_| SocketError::Closed)
    }
}

impl std::fmt::Debug for SecureSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureSocket")
            .field("id", &self.id)
            .field("connected_at", &self.connected_at)
            .finish_non_exhaustive()
    }
}

/// Errors raised by a single socket
#[derive(Debug, Error)]
pub enum SocketError {
    #[error("Event name is reserved: {0}")]
    ReservedEvent(String),

    #[error("No handler for event: {0}")]
    UnknownEvent(String),

    #[error("Connection closed")]
    Closed,
}
