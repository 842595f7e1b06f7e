//! Crawl report generation
//!
//! The report is built by the crawl driver as it goes and returned from
//! `CrawlEngine::run`. It is purely informational; nothing reads it back.

use crate::state::RelayOutcome;
use std::collections::HashMap;
use std::time::Duration;

/// Summary of one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Hex id of the root event
    pub root_id: String,

    /// Every dispatched relay with its outcome, in visit order
    pub outcomes: Vec<(String, RelayOutcome)>,

    /// Frontier entries skipped because the relay was already visited
    pub duplicate_pops: usize,

    /// Events returned by relays, duplicates included
    pub events_fetched: usize,

    /// Events written to disk
    pub events_written: usize,

    /// Events dropped because their id was already written
    pub duplicate_events: usize,

    /// Events whose write failed
    pub write_failures: usize,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlReport {
    /// Creates an empty report for the given root
    pub fn new(root_id: impl Into<String>) -> Self {
        Self {
            root_id: root_id.into(),
            ..Self::default()
        }
    }

    /// Records the outcome of a dispatched relay
    pub fn record_relay(&mut self, relay: &str, outcome: RelayOutcome) {
        self.outcomes.push((relay.to_string(), outcome));
    }

    /// Number of relays dispatched to the fetcher
    pub fn relays_visited(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of relays that ended in a per-relay error
    pub fn relays_failed(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_error()).count()
    }

    /// Number of times `relay` was dispatched (at most one in a correct crawl)
    pub fn visit_count(&self, relay: &str) -> usize {
        self.outcomes.iter().filter(|(r, _)| r == relay).count()
    }

    /// Outcome of the first visit to `relay`, if it was visited
    pub fn outcome_of(&self, relay: &str) -> Option<RelayOutcome> {
        self.outcomes
            .iter()
            .find(|(r, _)| r == relay)
            .map(|(_, outcome)| *outcome)
    }

    /// Count of relays by outcome
    pub fn outcome_counts(&self) -> HashMap<RelayOutcome, usize> {
        let mut counts = HashMap::new();
        for (_, outcome) in &self.outcomes {
            *counts.entry(*outcome).or_insert(0) += 1;
        }
        counts
    }

    /// One-line final status
    pub fn summary_line(&self) -> String {
        format!("crawl completed, {} items written", self.events_written)
    }
}

/// Prints the report to stdout in a formatted manner
pub fn print_report(report: &CrawlReport) {
    println!("=== Thread Crawl Report ===\n");

    println!("Root event: {}", report.root_id);
    println!("Duration: {:.1}s", report.elapsed.as_secs_f64());
    println!();

    println!("Relays:");
    println!("  Visited: {}", report.relays_visited());
    println!("  Failed: {}", report.relays_failed());
    println!("  Repeat suggestions skipped: {}", report.duplicate_pops);

    let mut counts: Vec<_> = report.outcome_counts().into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
    for (outcome, count) in counts {
        println!("  {}: {}", outcome, count);
    }
    println!();

    println!("Events:");
    println!("  Fetched: {}", report.events_fetched);
    println!("  Written: {}", report.events_written);
    println!("  Duplicates dropped: {}", report.duplicate_events);
    if report.write_failures > 0 {
        println!("  Write failures: {}", report.write_failures);
    }
    println!();

    println!("{}", report.summary_line());
}
