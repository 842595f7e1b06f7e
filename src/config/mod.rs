//! Configuration module for dumpthread
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Every field has a default, so a crawl can run from
//! command-line flags alone.
//!
//! # Example
//!
//! ```no_run
//! use dumpthread::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("dumpthread.toml")).unwrap();
//! println!("Query timeout: {}s", config.crawler.query_timeout_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, OutputConfig, WriteErrorPolicy, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_QUEUE_CAPACITY, DEFAULT_QUERY_TIMEOUT_SECS,
};

// Re-export parser and validation functions
pub use parser::{load_config, parse_config};
pub use validation::validate;
