//! Crawl engine - main crawl orchestration logic
//!
//! This module contains the breadth-first crawl loop that coordinates:
//! - Seeding the relay frontier
//! - Popping relays and skipping those already visited
//! - Fetching the thread from each relay
//! - Forwarding events to the persistence worker
//! - Enqueueing the relay hints found in those events
//! - Draining the persistence worker before reporting completion
//!
//! The driver owns the frontier and the visited set; the persistence worker owns
//! the processed set. The only thing they share is the bounded event queue.

use crate::config::{CrawlerConfig, WriteErrorPolicy};
use crate::crawler::fetcher::{extract_relay_hints, ThreadFetcher};
use crate::crawler::frontier::{Frontier, VisitedSet};
use crate::crawler::persistence::{PersistFailure, PersistenceWorker};
use crate::output::CrawlReport;
use crate::protocol::decode_root_id;
use crate::relay::RelayClient;
use crate::state::RelayOutcome;
use crate::storage::Persister;
use crate::DumpError;
use std::path::PathBuf;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Main crawl engine structure
pub struct CrawlEngine<C, P> {
    fetcher: ThreadFetcher<C>,
    persister: P,
    config: CrawlerConfig,
    output_dir: PathBuf,
}

impl<C: RelayClient, P: Persister> CrawlEngine<C, P> {
    /// Creates a new engine
    ///
    /// # Arguments
    ///
    /// * `client` - Opens relay connections
    /// * `persister` - Writes events; moved into the persistence worker on `run`
    /// * `config` - Timeouts, queue capacity and write-error policy
    /// * `output_dir` - Directory receiving `<id>.json` files
    pub fn new(client: C, persister: P, config: CrawlerConfig, output_dir: impl Into<PathBuf>) -> Self {
        let fetcher = ThreadFetcher::new(client, config.connect_timeout(), config.query_timeout());

        Self {
            fetcher,
            persister,
            config,
            output_dir: output_dir.into(),
        }
    }

    /// Runs the crawl to completion
    ///
    /// # Arguments
    ///
    /// * `root` - The root identifier (`note1…` or `nevent1…`)
    /// * `seeds` - Seed relays, visited first and in this order
    /// * `cancel` - Aborts the crawl, including any in-flight relay query
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - The frontier is empty and every queued event was handled
    /// * `Err(DumpError)` - The root could not be decoded, the crawl was cancelled,
    ///   or a write failed under the `abort` policy
    pub async fn run(
        self,
        root: &str,
        seeds: &[String],
        cancel: CancellationToken,
    ) -> Result<CrawlReport, DumpError> {
        let start_time = Instant::now();

        // Fatal before any relay is contacted
        let pointer = decode_root_id(root)?;
        tracing::info!("Fetching thread rooted at {}", pointer.id);

        let mut frontier = Frontier::new();
        for relay in seeds.iter().chain(pointer.relays.iter()) {
            let relay = relay.trim();
            if relay.is_empty() {
                tracing::warn!("Ignoring empty seed relay");
                continue;
            }
            tracing::info!("Adding relay: {}", relay);
            frontier.push(relay);
        }

        let Self {
            fetcher,
            persister,
            config,
            output_dir,
        } = self;

        let mut persistence =
            PersistenceWorker::spawn(persister, output_dir, config.queue_capacity);
        let mut visited = VisitedSet::new();
        let mut report = CrawlReport::new(pointer.id.to_string());
        let mut abort: Option<PersistFailure> = None;
        let mut cancelled = false;

        'crawl: loop {
            while let Some(failure) = persistence.try_failure() {
                if record_failure(failure, config.on_write_error, &mut abort) {
                    tracing::warn!("Stopping crawl after write failure");
                    break 'crawl;
                }
            }

            let Some(relay) = frontier.pop() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };

            if !visited.mark_visited(&relay) {
                report.duplicate_pops += 1;
                continue;
            }

            tracing::info!("Getting notes from: {}", relay);

            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = fetcher.fetch(&relay, &pointer.id) => Some(result),
            };

            let events = match fetched {
                None => {
                    report.record_relay(&relay, RelayOutcome::Cancelled);
                    cancelled = true;
                    break;
                }
                Some(Err(e)) => {
                    tracing::warn!("{}", e);
                    report.record_relay(&relay, RelayOutcome::from_error(&e));
                    continue;
                }
                Some(Ok(events)) => events,
            };

            tracing::info!("Got {} note(s) from: {}", events.len(), relay);
            report.record_relay(&relay, RelayOutcome::Fetched);
            report.events_fetched += events.len();

            let hints = extract_relay_hints(&events);

            for event in events {
                let sent = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    result = persistence.sender().send(event) => Some(result),
                };

                match sent {
                    None => {
                        cancelled = true;
                        break 'crawl;
                    }
                    // The worker only drops its receiver by panicking; finish() reports it
                    Some(Err(_)) => break 'crawl,
                    Some(Ok(())) => {}
                }
            }

            for hint in hints {
                if hint.is_empty() {
                    continue;
                }
                if visited.is_visited(&hint) {
                    tracing::trace!("Relay {} suggested again", hint);
                } else {
                    tracing::info!("Adding relay {} as suggested relay", hint);
                }
                frontier.push(hint);
            }

            tracing::debug!(
                "Progress: {} relays visited, {} in frontier",
                visited.len(),
                frontier.len()
            );
        }

        // Drain barrier: close the queue and wait for every queued event
        let (stats, remaining) = persistence.finish().await?;
        for failure in remaining {
            record_failure(failure, config.on_write_error, &mut abort);
        }

        report.events_written = stats.written;
        report.duplicate_events = stats.duplicates;
        report.write_failures = stats.failures;
        report.elapsed = start_time.elapsed();

        if cancelled {
            tracing::warn!(
                "Crawl cancelled after {} relays, {} items written",
                report.relays_visited(),
                report.events_written
            );
            return Err(DumpError::Cancelled);
        }

        if let Some(failure) = abort {
            return Err(DumpError::Persist {
                event_id: failure.event_id,
                source: failure.error,
            });
        }

        tracing::info!(
            "Crawl completed: {} relays visited, {} items written in {:?}",
            report.relays_visited(),
            report.events_written,
            report.elapsed
        );

        Ok(report)
    }
}

/// Logs a write failure and applies the policy
///
/// Returns true if the crawl must stop. Under `abort` the first failure is kept
/// as the crawl's error.
fn record_failure(
    failure: PersistFailure,
    policy: WriteErrorPolicy,
    abort: &mut Option<PersistFailure>,
) -> bool {
    tracing::error!("Failed to write event {}: {}", failure.event_id, failure.error);

    match policy {
        WriteErrorPolicy::Continue => false,
        WriteErrorPolicy::Abort => {
            if abort.is_none() {
                *abort = Some(failure);
            }
            true
        }
    }
}
