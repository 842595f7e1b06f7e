//! Thread fetcher implementation
//!
//! This module handles everything the crawl does against one relay:
//! - Opening a connection (bounded by the connect timeout)
//! - Querying the root event and every event referencing it (bounded by the query timeout)
//! - Closing the connection on every path
//!
//! Relay hint extraction is a separate pure function, `extract_relay_hints`.

use crate::protocol::{Event, EventId, Filter};
use crate::relay::{RelayClient, RelayConnection, RelayError, RelayResult};
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::time::timeout;

/// Fetches the root event and its replies from one relay at a time
pub struct ThreadFetcher<C> {
    client: C,
    connect_timeout: Duration,
    query_timeout: Duration,
}

impl<C: RelayClient> ThreadFetcher<C> {
    /// Creates a new fetcher
    ///
    /// # Arguments
    ///
    /// * `client` - The relay client used to open connections
    /// * `connect_timeout` - Budget for establishing one connection
    /// * `query_timeout` - Budget shared by both queries on one connection
    pub fn new(client: C, connect_timeout: Duration, query_timeout: Duration) -> Self {
        Self {
            client,
            connect_timeout,
            query_timeout,
        }
    }

    /// Fetches the thread rooted at `root` from `relay`
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Event>)` - The root event first (if the relay has it), then every
    ///   referencing event in the order the relay sent them
    /// * `Err(RelayError)` - Connection failure, query failure, or timeout
    pub async fn fetch(&self, relay: &str, root: &EventId) -> RelayResult<Vec<Event>> {
        let mut connection = match timeout(self.connect_timeout, self.client.connect(relay)).await
        {
            Ok(connection) => connection?,
            Err(_) => {
                return Err(RelayError::Timeout {
                    relay: relay.to_string(),
                    seconds: self.connect_timeout.as_secs(),
                })
            }
        };

        let result = timeout(self.query_timeout, query_thread(&mut connection, root)).await;

        connection.close().await;

        match result {
            Ok(events) => events,
            Err(_) => Err(RelayError::Timeout {
                relay: relay.to_string(),
                seconds: self.query_timeout.as_secs(),
            }),
        }
    }
}

/// Runs both thread queries on one connection
///
/// If the relay goes away during the second query, whatever the first one
/// collected is still returned. A refused subscription fails the whole fetch.
async fn query_thread<T: RelayConnection>(
    connection: &mut T,
    root: &EventId,
) -> RelayResult<Vec<Event>> {
    let mut events = connection.query(&Filter::by_id(root)).await?;

    match connection.query(&Filter::referencing(root)).await {
        Ok(replies) => events.extend(replies),
        Err(e @ (RelayError::ConnectionClosed { .. } | RelayError::Transport { .. }))
            if !events.is_empty() =>
        {
            tracing::warn!("{}, keeping {} event(s)", e, events.len());
        }
        Err(e) => return Err(e),
    }

    Ok(events)
}

/// Collects the relay hints carried by the tags of `events`
///
/// Hints are trimmed and deduplicated by exact string equality. Empty hints are
/// kept; the caller filters them before enqueueing.
pub fn extract_relay_hints(events: &[Event]) -> BTreeSet<String> {
    events
        .iter()
        .flat_map(|event| event.tags.iter())
        .map(|tag| tag.relay_hint().trim().to_string())
        .collect()
}
