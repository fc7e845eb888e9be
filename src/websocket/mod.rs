//! WebSocket Connection Server
//!
//! Accepts real-time connections and dispatches their lifecycle to the
//! registered listeners.
//!
//! ## Architecture
//!
//! - **Server**: Tracks live connections and the listener registry
//! - **SecureSocket**: A wrapped connection that listeners attach handlers to
//! - **Handler**: Handles WebSocket upgrade and the per-connection loops
//! - **Messages**: Defines the JSON event envelope
//!
//! ## Usage
//!
//! Clients connect to `/ws`, receive a `connected` event carrying their
//! connection id, and then send events by name:
//!
//! ```javascript
//! // Browser
//! const ws = new WebSocket('ws://localhost:8090/ws');
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({event: 'ping', data: Date.now()}));
//! };
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   console.log(msg.event, msg.data);
//! };
//! ```

mod handler;
mod messages;
mod server;
mod socket;

pub use handler::websocket_handler;
pub use messages::{ClientMessage, ServerMessage, SocketEvent};
pub use server::{Server, ServerError};
pub use socket::{ConnectionId, EventHandler, SecureSocket, SocketError};
