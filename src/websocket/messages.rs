//! WebSocket Message Types
//!
//! Every frame exchanged with a client is a JSON envelope carrying an event
//! name and an arbitrary payload.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Transport-level lifecycle events. Listeners may not claim these names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketEvent {
    /// A new transport connection was accepted
    Connection,
    /// A transport connection went away
    Disconnect,
    /// Sent to the client once the connection is registered
    Connected,
    /// Sent to the client when a frame could not be handled
    Error,
}

impl SocketEvent {
    pub const ALL: [SocketEvent; 4] = [
        SocketEvent::Connection,
        SocketEvent::Disconnect,
        SocketEvent::Connected,
        SocketEvent::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SocketEvent::Connection => "connection",
            SocketEvent::Disconnect => "disconnect",
            SocketEvent::Connected => "connected",
            SocketEvent::Error => "error",
        }
    }

    /// Check whether an event name is reserved for the transport lifecycle
    pub fn is_reserved(event: &str) -> bool {
        Self::ALL.iter().any(|e| e.as_str() == event)
    }
}

/// Message sent from client to server
#[derive(Debug, Clone, Deserialize)]
pub struct ClientMessage {
    /// Event name, matched against the handlers listeners attached
    pub event: String,
    /// Event payload (defaults to `null`)
    #[serde(default)]
    pub data: Value,
}

/// Message sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerMessage {
    pub event: String,
    pub data: Value,
}

impl ServerMessage {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Connection established
    pub fn connected(connection_id: &str) -> Self {
        Self::new(
            SocketEvent::Connected.as_str(),
            json!({ "id": connection_id }),
        )
    }

    /// Error description; the connection stays open
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(
            SocketEvent::Error.as_str(),
            json!({ "message": message.into() }),
        )
    }
}
