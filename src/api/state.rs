//! Application State
//!
//! Shared state accessible by all HTTP and WebSocket handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use super::error::ApiResult;
use crate::config::{Config, ServerConfig};
use crate::listeners::default_listeners;
use crate::websocket::Server;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Connection lifecycle manager
    pub server: Arc<Server>,
    /// HTTP server configuration
    pub config: Arc<ServerConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(server: Arc<Server>, config: ServerConfig) -> Self {
        Self {
            server,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Build state from configuration, seeding the default listeners
    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let server = Server::with_listeners(config.hub.clone(), default_listeners())?;
        Ok(Self::new(Arc::new(server), config.server.clone()))
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
