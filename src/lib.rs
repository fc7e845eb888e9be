//! # Switchboard
//!
//! A minimal real-time connection server. WebSocket connections are wrapped
//! in a [`SecureSocket`] and handed to a registry of pluggable listeners,
//! each of which owns one event name and attaches its handlers to every new
//! connection.
//!
//! ## Modules
//!
//! - [`websocket`]: Connection lifecycle, secure sockets and the WebSocket transport
//! - [`listeners`]: Listener trait, registry and built-in listeners
//! - [`api`]: HTTP server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use switchboard::config::{HubConfig, ServerConfig};
//! use switchboard::listeners::default_listeners;
//! use switchboard::{serve, AppState, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::with_listeners(HubConfig::default(), default_listeners())?;
//!     let state = AppState::new(Arc::new(server), ServerConfig::default());
//!
//!     serve(state, &ServerConfig::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod listeners;
pub mod websocket;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError, HubConfig, LoggingConfig, ServerConfig};

pub use listeners::{default_listeners, Listener, ListenerError, ListenerOptions, ListenerRegistry};

pub use websocket::{
    websocket_handler, ClientMessage, ConnectionId, SecureSocket, Server, ServerError,
    ServerMessage, SocketError, SocketEvent,
};
