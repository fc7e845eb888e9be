//! Listener Registry
//!
//! Keeps listeners in registration order and enforces that no two share an
//! event name. Batches are validated in full before anything is committed.

use std::collections::HashSet;
use thiserror::Error;

use super::Listener;
use crate::websocket::SocketEvent;

/// Registered listeners, in registration order
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<Box<dyn Listener>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a single listener
    pub fn register(&mut self, listener: Box<dyn Listener>) -> Result<(), ListenerError> {
        self.register_many(vec![listener])
    }

    /// Register a batch of listeners
    ///
    /// Either every listener in the batch is added or none is.
    pub fn register_many(
        &mut self,
        listeners: Vec<Box<dyn Listener>>,
    ) -> Result<(), ListenerError> {
        {
            let mut taken: HashSet<&str> = self.listeners.iter().map(|l| l.event()).collect();

            for listener in &listeners {
                let event = listener.event();
                if SocketEvent::is_reserved(event) {
                    return Err(ListenerError::ReservedEvent(event.to_string()));
                }
                if !taken.insert(event) {
                    return Err(ListenerError::DuplicateEvent(event.to_string()));
                }
            }
        }

        tracing::debug!(
            events = ?listeners.iter().map(|l| l.event()).collect::<Vec<_>>(),
            "Registered listeners"
        );

        self.listeners.extend(listeners);
        Ok(())
    }

    /// Check whether a listener handles `event`
    pub fn contains(&self, event: &str) -> bool {
        self.listeners.iter().any(|l| l.event() == event)
    }

    /// Event names in registration order
    pub fn events(&self) -> Vec<String> {
        self.listeners.iter().map(|l| l.event().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Listener> {
        self.listeners.iter().map(|l| l.as_ref())
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("events", &self.events())
            .finish()
    }
}

/// Errors raised while registering listeners
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListenerError {
    #[error("A listener for event '{0}' is already registered")]
    DuplicateEvent(String),

    #[error("Event name '{0}' is reserved")]
    ReservedEvent(String),
}
