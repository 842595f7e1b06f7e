//! Persistence path
//!
//! A single worker task consumes events from a bounded queue and writes each
//! one through a [`Persister`], unless its id is already in the `ProcessedSet`.
//! The worker exclusively owns the processed set, so it needs no lock.
//!
//! Write failures never terminate anything here. They are reported back to the
//! crawl driver over a side channel and the driver applies its policy.

use crate::protocol::Event;
use crate::storage::{PersistError, Persister};
use crate::DumpError;
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Monotonic set of event ids already written to disk
#[derive(Debug, Default)]
pub struct ProcessedSet {
    ids: HashSet<String>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_processed(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Records an id as written; returns false if it was already present
    pub fn mark_processed(&mut self, id: &str) -> bool {
        if self.ids.contains(id) {
            return false;
        }
        self.ids.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// A failed write, reported to the crawl driver
#[derive(Debug)]
pub struct PersistFailure {
    pub event_id: String,
    pub error: PersistError,
}

/// Counters kept by the persistence worker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistStats {
    /// Events written to disk
    pub written: usize,

    /// Events dropped because their id was already written
    pub duplicates: usize,

    /// Events whose write failed
    pub failures: usize,
}

/// Handle on the running persistence worker
///
/// The crawl driver is the only producer. Dropping the sender (via
/// [`PersistenceWorker::finish`]) closes the queue; the worker then drains what
/// is left and exits.
pub struct PersistenceWorker {
    sender: mpsc::Sender<Event>,
    failures: mpsc::UnboundedReceiver<PersistFailure>,
    handle: JoinHandle<PersistStats>,
}

impl PersistenceWorker {
    /// Spawns the worker task
    ///
    /// # Arguments
    ///
    /// * `persister` - Writes one event; owned by the worker
    /// * `directory` - Output directory passed to every write
    /// * `capacity` - Bound of the event queue
    pub fn spawn<P: Persister>(persister: P, directory: PathBuf, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let (failure_tx, failures) = mpsc::unbounded_channel();

        let handle = tokio::spawn(run_worker(persister, directory, receiver, failure_tx));

        Self {
            sender,
            failures,
            handle,
        }
    }

    /// Sender side of the event queue
    ///
    /// `send` waits while the queue is full, which is what throttles the crawl
    /// when the disk falls behind.
    pub fn sender(&self) -> &mpsc::Sender<Event> {
        &self.sender
    }

    /// Returns the next reported failure without waiting
    pub fn try_failure(&mut self) -> Option<PersistFailure> {
        self.failures.try_recv().ok()
    }

    /// Closes the queue and waits until every queued event has been handled
    ///
    /// # Returns
    ///
    /// * `Ok((PersistStats, Vec<PersistFailure>))` - Final counters and failures not yet taken
    /// * `Err(DumpError)` - The worker task panicked
    pub async fn finish(self) -> Result<(PersistStats, Vec<PersistFailure>), DumpError> {
        let Self {
            sender,
            mut failures,
            handle,
        } = self;
        drop(sender);

        let stats = handle
            .await
            .map_err(|e| DumpError::WorkerPanicked(e.to_string()))?;

        // The worker has exited, so the failure channel holds everything left
        let mut remaining = Vec::new();
        while let Ok(failure) = failures.try_recv() {
            remaining.push(failure);
        }

        Ok((stats, remaining))
    }
}

async fn run_worker<P: Persister>(
    persister: P,
    directory: PathBuf,
    mut receiver: mpsc::Receiver<Event>,
    failures: mpsc::UnboundedSender<PersistFailure>,
) -> PersistStats {
    let mut processed = ProcessedSet::new();
    let mut stats = PersistStats::default();

    while let Some(event) = receiver.recv().await {
        if processed.is_processed(&event.id) {
            stats.duplicates += 1;
            tracing::trace!("Skipping already written event {}", event.id);
            continue;
        }

        match persister.write(&event, &directory).await {
            Ok(path) => {
                processed.mark_processed(&event.id);
                stats.written += 1;
                tracing::debug!("Wrote {}", path.display());
            }
            Err(error) => {
                // Not marked processed: a copy from another relay may succeed
                stats.failures += 1;
                let _ = failures.send(PersistFailure {
                    event_id: event.id,
                    error,
                });
            }
        }
    }

    tracing::debug!(
        "Persistence worker finished: {} written, {} duplicates, {} failures",
        stats.written,
        stats.duplicates,
        stats.failures
    );

    stats
}
