//! Connection Lifecycle
//!
//! The [`Server`] owns the live connections and the listener registry. The
//! transport adapter reports connects, inbound events and disconnects here;
//! every new connection is fanned out to each listener exactly once, in
//! registration order.

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use super::socket::{ConnectionId, SecureSocket, SocketError};
use crate::config::HubConfig;
use crate::listeners::{Listener, ListenerError, ListenerRegistry};

/// Connection registry plus listener registry
pub struct Server {
    /// Live connections, in connection order
    connections: RwLock<Vec<Arc<SecureSocket>>>,
    /// Listeners fanned out to on every new connection
    listeners: RwLock<ListenerRegistry>,
    config: HubConfig,
}

impl Server {
    /// Create a server with no listeners
    pub fn new(config: HubConfig) -> Self {
        Self {
            connections: RwLock::new(Vec::new()),
            listeners: RwLock::new(ListenerRegistry::new()),
            config,
        }
    }

    /// Create a server seeded with an initial listener set
    pub fn with_listeners(
        config: HubConfig,
        listeners: Vec<Box<dyn Listener>>,
    ) -> Result<Self, ListenerError> {
        let mut registry = ListenerRegistry::new();
        registry.register_many(listeners)?;

        Ok(Self {
            connections: RwLock::new(Vec::new()),
            listeners: RwLock::new(registry),
            config,
        })
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Register one more listener; only connections made afterwards see it
    pub async fn add_listener(&self, listener: Box<dyn Listener>) -> Result<(), ListenerError> {
        self.listeners.write().await.register(listener)
    }

    /// Register a batch of listeners, all or nothing
    pub async fn add_listeners(
        &self,
        listeners: Vec<Box<dyn Listener>>,
    ) -> Result<(), ListenerError> {
        self.listeners.write().await.register_many(listeners)
    }

    /// Track a new connection and hand it to every listener
    ///
    /// Fails without side effects when the connection limit is reached.
    pub async fn on_connection(&self, socket: Arc<SecureSocket>) -> Result<(), ServerError> {
        {
            let mut connections = self.connections.write().await;
            if connections.len() >= self.config.max_connections {
                return Err(ServerError::TooManyConnections(self.config.max_connections));
            }
            connections.push(Arc::clone(&socket));
        }

        if let Err(e) = socket.initialize() {
            tracing::debug!(
                connection_id = %socket.id(),
                error = %e,
                "Client gone before initialization"
            );
        }

        let listeners = self.listeners.read().await;
        for listener in listeners.iter() {
            if let Err(e) = listener.initialize_socket(&socket) {
                tracing::warn!(
                    connection_id = %socket.id(),
                    event = %listener.event(),
                    error = %e,
                    "Listener failed to initialize socket"
                );
            }
        }

        tracing::info!(
            connection_id = %socket.id(),
            listeners = listeners.len(),
            "WebSocket connected"
        );
        Ok(())
    }

    /// Stop tracking a connection
    ///
    /// Remaining connections keep their relative order. Returns the removed
    /// socket, or `None` if the id was not registered.
    pub async fn on_disconnected(&self, id: &str) -> Option<Arc<SecureSocket>> {
        let removed = {
            let mut connections = self.connections.write().await;
            let index = connections.iter().position(|s| s.id() == id);
            index.map(|index| connections.remove(index))
        };

        match &removed {
            Some(_) => tracing::info!(connection_id = %id, "{} disconnected.", id),
            None => tracing::debug!(connection_id = %id, "Disconnect for unknown connection"),
        }

        removed
    }

    /// Run the handler a listener attached to connection `id` for `event`
    pub async fn dispatch(&self, id: &str, event: &str, data: Value) -> Result<(), ServerError> {
        let socket = self
            .get(id)
            .await
            .ok_or_else(|| ServerError::ConnectionNotFound(id.to_string()))?;

        socket.handle(event, data)?;
        Ok(())
    }

    /// Look up a live connection
    pub async fn get(&self, id: &str) -> Option<Arc<SecureSocket>> {
        self.connections
            .read()
            .await
            .iter()
            .find(|s| s.id() == id)
            .cloned()
    }

    /// Get the current connection count
    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Snapshot of live connections in connection order
    pub async fn connections(&self) -> Vec<Arc<SecureSocket>> {
        self.connections.read().await.clone()
    }

    /// Connection identifiers in connection order
    pub async fn connection_ids(&self) -> Vec<ConnectionId> {
        self.connections
            .read()
            .await
            .iter()
            .map(|s| s.id().to_string())
            .collect()
    }

    pub async fn listener_count(&self) -> usize {
        self.listeners.read().await.len()
    }

    /// Listener event names in registration order
    pub async fn listener_events(&self) -> Vec<String> {
        self.listeners.read().await.events()
    }
}

/// Errors that can occur while managing connections
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),

    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    #[error(transparent)]
    Socket(#[from] SocketError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listeners::{default_listeners, ListenerOptions};
    use crate::websocket::ServerMessage;
    use serde_json::json;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    /// Records every socket it is handed as `(event, connection_id)`
    struct RecordingListener {
        options: ListenerOptions,
        calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl Listener for RecordingListener {
        fn options(&self) -> &ListenerOptions {
            &self.options
        }

        fn initialize_socket(&self, socket: &SecureSocket) -> Result<(), SocketError> {
            self.calls
                .lock()
                .unwrap()
                .push((self.options.event.clone(), socket.id().to_string()));
            Ok(())
        }
    }

    fn recording(event: &str, calls: &Arc<Mutex<Vec<(String, String)>>>) -> Box<dyn Listener> {
        Box::new(RecordingListener {
            options: ListenerOptions::new(event),
            calls: Arc::clone(calls),
        })
    }

    fn socket() -> (Arc<SecureSocket>, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(SecureSocket::new(tx)), rx)
    }

    #[tokio::test]
    async fn test_fan_out_in_registration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let server = Server::with_listeners(
            HubConfig::default(),
            vec![recording("chat", &calls), recording("ping", &calls), recording("news", &calls)],
        )
        .unwrap();

        let (socket, _rx) = socket();
        server.on_connection(Arc::clone(&socket)).await.unwrap();

        let calls = calls.lock().unwrap();
        let id = socket.id().to_string();
        assert_eq!(
            *calls,
            vec![
                ("chat".to_string(), id.clone()),
                ("ping".to_string(), id.clone()),
                ("news".to_string(), id),
            ]
        );
    }

    #[tokio::test]
    async fn test_connection_sends_connected() {
        let server = Server::new(HubConfig::default());
        let (socket, mut rx) = socket();

        server.on_connection(Arc::clone(&socket)).await.unwrap();

        assert_eq!(rx.try_recv().unwrap(), ServerMessage::connected(socket.id()));
        assert_eq!(server.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_disconnect_removes_connection() {
        let server = Server::new(HubConfig::default());
        let (socket, _rx) = socket();

        server.on_connection(Arc::clone(&socket)).await.unwrap();
        assert_eq!(server.connection_count().await, 1);

        let removed = server.on_disconnected(socket.id()).await;
        assert!(removed.is_some());
        assert_eq!(server.connection_count().await, 0);
        assert!(server.get(socket.id()).await.is_none());
    }

    #[tokio::test]
    async fn test_disconnect_middle_keeps_order() {
        let server = Server::new(HubConfig::default());
        let (first, _rx1) = socket();
        let (second, _rx2) = socket();
        let (third, _rx3) = socket();

        for s in [&first, &second, &third] {
            server.on_connection(Arc::clone(s)).await.unwrap();
        }

        server.on_disconnected(second.id()).await;

        assert_eq!(
            server.connection_ids().await,
            vec![first.id().to_string(), third.id().to_string()]
        );
    }

    #[tokio::test]
    async fn test_disconnect_unknown_is_noop() {
        let server = Server::new(HubConfig::default());
        let (socket, _rx) = socket();
        server.on_connection(socket).await.unwrap();

        assert!(server.on_disconnected("nope").await.is_none());
        assert_eq!(server.connection_count().await, 1);
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let config = HubConfig {
            max_connections: 2,
            ..HubConfig::default()
        };
        let server = Server::new(config);

        let (s1, _rx1) = socket();
        let (s2, _rx2) = socket();
        let (s3, _rx3) = socket();

        server.on_connection(s1).await.unwrap();
        server.on_connection(s2).await.unwrap();
        let result = server.on_connection(Arc::clone(&s3)).await;

        assert!(matches!(result, Err(ServerError::TooManyConnections(2))));
        assert_eq!(server.connection_count().await, 2);
        assert!(server.get(s3.id()).await.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_reaches_listener_handler() {
        let server = Server::with_listeners(HubConfig::default(), default_listeners()).unwrap();
        let (socket, mut rx) = socket();

        server.on_connection(Arc::clone(&socket)).await.unwrap();
        let _connected = rx.try_recv().unwrap();

        server.dispatch(socket.id(), "ping", json!(1)).await.unwrap();
        assert_eq!(rx.try_recv().unwrap(), ServerMessage::new("pong", json!(1)));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_event() {
        let server = Server::new(HubConfig::default());
        let (socket, _rx) = socket();
        server.on_connection(Arc::clone(&socket)).await.unwrap();

        let result = server.dispatch(socket.id(), "chat", Value::Null).await;
        assert!(matches!(result, Err(ServerError::Socket(SocketError::UnknownEvent(_)))));

        let result = server.dispatch("missing", "chat", Value::Null).await;
        assert!(matches!(result, Err(ServerError::ConnectionNotFound(_))));
    }

    #[tokio::test]
    async fn test_listener_added_after_startup() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let server = Server::new(HubConfig::default());

        let (early, _rx1) = socket();
        server.on_connection(Arc::clone(&early)).await.unwrap();

        server.add_listener(recording("chat", &calls)).await.unwrap();

        let (late, _rx2) = socket();
        server.on_connection(Arc::clone(&late)).await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(*calls, vec![("chat".to_string(), late.id().to_string())]);
    }

    #[tokio::test]
    async fn test_add_duplicate_listener() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let server = Server::new(HubConfig::default());

        server
            .add_listeners(vec![recording("chat", &calls), recording("ping", &calls)])
            .await
            .unwrap();
        assert_eq!(server.listener_count().await, 2);

        let result = server.add_listener(recording("chat", &calls)).await;
        assert!(matches!(result, Err(ListenerError::DuplicateEvent(_))));
        assert_eq!(server.listener_count().await, 2);
        assert_eq!(server.listener_events().await, vec!["chat", "ping"]);
    }

    #[test]
    fn test_duplicate_default_set_rejected() {
        let mut listeners = default_listeners();
        listeners.extend(default_listeners());

        let result = Server::with_listeners(HubConfig::default(), listeners);
        assert!(matches!(result, Err(ListenerError::DuplicateEvent(_))));
    }
}
