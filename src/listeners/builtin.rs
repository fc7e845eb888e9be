//! Built-in listeners registered by default.

use serde_json::Value;

use super::{Listener, ListenerOptions};
use crate::websocket::{SecureSocket, SocketError};

/// Answers `ping` with `pong`, echoing the payload for round-trip timing
pub struct PingListener {
    options: ListenerOptions,
}

impl Default for PingListener {
    fn default() -> Self {
        Self {
            options: ListenerOptions::new("ping"),
        }
    }
}

impl Listener for PingListener {
    fn options(&self) -> &ListenerOptions {
        &self.options
    }

    fn initialize_socket(&self, socket: &SecureSocket) -> Result<(), SocketError> {
        socket.on(&self.options.event, |socket, data| reply(socket, "pong", data))
    }
}

/// Sends every `echo` payload straight back to its sender
pub struct EchoListener {
    options: ListenerOptions,
}

impl Default for EchoListener {
    fn default() -> Self {
        Self {
            options: ListenerOptions::new("echo"),
        }
    }
}

impl Listener for EchoListener {
    fn options(&self) -> &ListenerOptions {
        &self.options
    }

    fn initialize_socket(&self, socket: &SecureSocket) -> Result<(), SocketError> {
        socket.on(&self.options.event, |socket, data| reply(socket, "echo", data))
    }
}

fn reply(socket: &SecureSocket, event: &str, data: Value) {
    if let Err(e) = socket.emit(event, data) {
        tracing::debug!(connection_id = %socket.id(), error = %e, "Reply dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::ServerMessage;
    use serde_json::json;
    use tokio::sync::mpsc;

    #[test]
    fn test_ping_replies_pong() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let socket = SecureSocket::new(tx);

        PingListener::default().initialize_socket(&socket).unwrap();
        socket.handle("ping", json!({"t": 42})).unwrap();

        assert_eq!(rx.try_recv().unwrap(), ServerMessage::new("pong", json!({"t": 42})));
    }

    #[test]
    fn test_echo_returns_payload() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let socket = SecureSocket::new(tx);

        EchoListener::default().initialize_socket(&socket).unwrap();
        socket.handle("echo", json!("hello")).unwrap();

        assert_eq!(rx.try_recv().unwrap(), ServerMessage::new("echo", json!("hello")));
    }

    #[test]
    fn test_default_events() {
        let events: Vec<_> = crate::listeners::default_listeners()
            .iter()
            .map(|l| l.event().to_string())
            .collect();
        assert_eq!(events, vec!["ping", "echo"]);
    }
}
