//! Connection and listener introspection.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{ConnectionListResponse, ConnectionResponse, ListenerListResponse};
use crate::api::state::AppState;

/// GET /api/v1/connections
///
/// Live connections in connection order.
pub async fn list_connections(State(state): State<Arc<AppState>>) -> Json<ConnectionListResponse> {
    let connections: Vec<_> = state
        .server
        .connections()
        .await
        .iter()
        .map(|socket| ConnectionResponse {
            id: socket.id().to_string(),
            connected_at: socket.connected_at(),
        })
        .collect();

    let total = connections.len();
    Json(ConnectionListResponse { connections, total })
}

/// GET /api/v1/listeners
///
/// Registered listener events in registration order.
pub async fn list_listeners(State(state): State<Arc<AppState>>) -> Json<ListenerListResponse> {
    let events = state.server.listener_events().await;
    let total = events.len();
    Json(ListenerListResponse { events, total })
}
