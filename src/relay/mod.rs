//! Relay client module
//!
//! This module defines the contract the crawler consumes to talk to relays
//! and provides its WebSocket implementation:
//! - `RelayClient` opens one connection per relay visit
//! - `RelayConnection` runs synchronous queries (REQ until EOSE) and is closed after use
//! - `WebSocketClient` implements both over `tokio-tungstenite`

mod traits;
mod websocket;

pub use traits::{RelayClient, RelayConnection, RelayError, RelayResult};
pub use websocket::{WebSocketClient, WebSocketConnection};
