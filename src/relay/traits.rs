//! Relay client traits and error types
//!
//! The crawl engine is generic over these traits so it can be driven by the
//! WebSocket client in production and by in-memory relays in tests.

use crate::protocol::{Event, Filter};
use crate::ProtocolError;
use std::future::Future;
use thiserror::Error;

/// Errors that can occur while talking to a single relay
///
/// All of these are per-relay and recoverable: the crawler logs them and moves
/// on to the next relay in the frontier.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Invalid relay address '{relay}': {reason}")]
    InvalidAddress { relay: String, reason: String },

    #[error("Failed to connect to {relay}: {message}")]
    Connect { relay: String, message: String },

    #[error("Transport error on {relay}: {message}")]
    Transport { relay: String, message: String },

    #[error("{relay} timed out after {seconds}s")]
    Timeout { relay: String, seconds: u64 },

    #[error("Relay {relay} closed the subscription: {reason}")]
    SubscriptionClosed { relay: String, reason: String },

    #[error("Relay {relay} closed the connection before end of stored events")]
    ConnectionClosed { relay: String },

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Opens connections to relays
pub trait RelayClient: Send + Sync {
    /// The connection type produced by this client
    type Connection: RelayConnection;

    /// Connects to the relay at `address`
    ///
    /// # Arguments
    ///
    /// * `address` - The relay address, already trimmed
    ///
    /// # Returns
    ///
    /// * `Ok(Connection)` - An open connection, owned by the caller
    /// * `Err(RelayError)` - The relay is unreachable or the address is unusable
    fn connect(
        &self,
        address: &str,
    ) -> impl Future<Output = RelayResult<Self::Connection>> + Send;
}

/// An open connection to one relay
///
/// Connections are scoped to a single fetch and never shared between crawl steps.
pub trait RelayConnection: Send {
    /// Runs a query and returns every stored event the relay sends for it
    ///
    /// The query completes when the relay signals end of stored events. Events
    /// are returned in the order the relay sent them.
    fn query(&mut self, filter: &Filter) -> impl Future<Output = RelayResult<Vec<Event>>> + Send;

    /// Closes the connection, ignoring errors
    fn close(self) -> impl Future<Output = ()> + Send;
}
