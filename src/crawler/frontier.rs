//! Relay frontier and visited set
//!
//! This module holds the two pieces of crawl state owned by the driver:
//! - `Frontier`: FIFO queue of relay addresses waiting for a visit
//! - `VisitedSet`: relays already dispatched to the fetcher
//!
//! The frontier may hold the same address several times; the visited set is
//! what guarantees a relay is fetched at most once. Both are owned by a single
//! task, so no locking is involved.

use std::collections::{HashSet, VecDeque};

/// FIFO queue of relay addresses pending a visit
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a relay address to the back of the queue
    ///
    /// Duplicates are accepted; they are absorbed by the visited check on pop.
    pub fn push(&mut self, relay: impl Into<String>) {
        self.queue.push_back(relay.into());
    }

    /// Removes the oldest pending relay, or returns None when the queue is empty
    ///
    /// This never waits. An empty frontier means the crawl is over, because the
    /// only producer is the same driver that drains it.
    pub fn pop(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Monotonic set of relays already dispatched to the fetcher
#[derive(Debug, Default)]
pub struct VisitedSet {
    relays: HashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visited(&self, relay: &str) -> bool {
        self.relays.contains(relay)
    }

    /// Marks a relay as visited
    ///
    /// # Returns
    ///
    /// * `true` - The relay was not visited before and must now be fetched
    /// * `false` - The relay was already visited and must be skipped
    pub fn mark_visited(&mut self, relay: &str) -> bool {
        if self.relays.contains(relay) {
            return false;
        }
        self.relays.insert(relay.to_string())
    }

    pub fn len(&self) -> usize {
        self.relays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relays.is_empty()
    }
}
