//! Pluggable Event Listeners
//!
//! A listener owns exactly one event name. Every new connection is handed to
//! each registered listener once, in registration order, so the listener can
//! attach its handlers to the socket.
//!
//! ## Built-in listeners
//!
//! - [`PingListener`]: answers `ping` with `pong`
//! - [`EchoListener`]: sends `echo` payloads back to the sender

mod builtin;
mod registry;

pub use builtin::{EchoListener, PingListener};
pub use registry::{ListenerError, ListenerRegistry};

use crate::websocket::{SecureSocket, SocketError};

/// Options a listener is registered under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Event name this listener handles; unique across the registry
    pub event: String,
}

impl ListenerOptions {
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
        }
    }
}

/// A named handler invoked once per new connection
pub trait Listener: Send + Sync {
    fn options(&self) -> &ListenerOptions;

    /// Attach this listener's handlers to a freshly connected socket
    fn initialize_socket(&self, socket: &SecureSocket) -> Result<(), SocketError>;

    /// Event name this listener is registered under
    fn event(&self) -> &str {
        &self.options().event
    }
}

/// The listeners every server starts with
pub fn default_listeners() -> Vec<Box<dyn Listener>> {
    vec![
        Box::new(PingListener::default()),
        Box::new(EchoListener::default()),
    ]
}
