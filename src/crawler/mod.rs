//! Crawler module for thread discovery
//!
//! This module contains the core crawling logic, including:
//! - Fetching the root note and its replies from one relay
//! - Extracting relay hints from fetched notes
//! - Frontier and visited-set management
//! - The persistence worker and its processed set
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod persistence;

pub use coordinator::CrawlEngine;
pub use fetcher::{extract_relay_hints, ThreadFetcher};
pub use frontier::{Frontier, VisitedSet};
pub use persistence::{PersistFailure, PersistStats, PersistenceWorker, ProcessedSet};

use crate::config::Config;
use crate::output::CrawlReport;
use crate::relay::WebSocketClient;
use crate::storage::{prepare_output_dir, FsPersister};
use crate::DumpError;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl against the live relay network
///
/// This is the main entry point for saving a thread. It will:
/// 1. Create the output directory if needed
/// 2. Build the WebSocket relay client and the filesystem persister
/// 3. Crawl from `config.relays` until no unvisited relay remains
///
/// # Arguments
///
/// * `config` - The crawl configuration; `relays` holds the seed relays
/// * `root` - The root identifier (`note1…` or `nevent1…`)
/// * `cancel` - Cancels the crawl
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl completed
/// * `Err(DumpError)` - Crawl failed
pub async fn crawl(
    config: &Config,
    root: &str,
    cancel: CancellationToken,
) -> Result<CrawlReport, DumpError> {
    prepare_output_dir(&config.output.directory).await?;

    let engine = CrawlEngine::new(
        WebSocketClient::new(),
        FsPersister::new(),
        config.crawler.clone(),
        config.output.directory.clone(),
    );

    engine.run(root, &config.relays, cancel).await
}
