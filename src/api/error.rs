//! API Error Types
//!
//! Failures while setting up or running the HTTP server.

use thiserror::Error;

use crate::listeners::ListenerError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Listener registration failed
    #[error("Listener error: {0}")]
    Listener(#[from] ListenerError),

    /// Binding or accepting failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
