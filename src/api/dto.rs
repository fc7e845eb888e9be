//! Data Transfer Objects
//!
//! Response types for the HTTP endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: healthy
    pub status: String,
    /// Live WebSocket connections
    pub connections: usize,
    /// Registered listeners
    pub listeners: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

/// A live connection
#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    pub id: String,
    pub connected_at: DateTime<Utc>,
}

/// Connection list response
#[derive(Debug, Serialize)]
pub struct ConnectionListResponse {
    pub connections: Vec<ConnectionResponse>,
    pub total: usize,
}

/// Listener list response
#[derive(Debug, Serialize)]
pub struct ListenerListResponse {
    /// Event names in registration order
    pub events: Vec<String>,
    pub total: usize,
}
