//! Output module for crawl reports
//!
//! This module handles:
//! - Collecting per-relay outcomes and event counts while the crawl runs
//! - Printing the final crawl report

mod report;

pub use report::{print_report, CrawlReport};
