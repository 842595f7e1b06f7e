use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Default per-relay query budget in seconds
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 20;

/// Default connection timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default bound of the persistence queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 20;

/// Main configuration structure for dumpthread
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Extra seed relays, visited after the ones given on the command line
    #[serde(default)]
    pub relays: Vec<String>,

    #[serde(default)]
    pub crawler: CrawlerConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// What the crawl does when an event cannot be written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteErrorPolicy {
    /// Log the failure and keep crawling
    #[default]
    Continue,

    /// Stop visiting relays, drain the queue, and fail the crawl
    Abort,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrawlerConfig {
    /// Time budget for all queries issued over one relay connection
    #[serde(rename = "query-timeout-secs", default = "default_query_timeout")]
    pub query_timeout_secs: u64,

    /// Time budget for establishing one relay connection
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Capacity of the queue between the crawl driver and the persistence worker
    #[serde(rename = "queue-capacity", default = "default_queue_capacity")]
    pub queue_capacity: usize,

    #[serde(rename = "on-write-error", default)]
    pub on_write_error: WriteErrorPolicy,
}

impl CrawlerConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            on_write_error: WriteErrorPolicy::default(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory receiving one `<id>.json` file per event
    #[serde(default = "default_output_dir")]
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_dir(),
        }
    }
}

fn default_query_timeout() -> u64 {
    DEFAULT_QUERY_TIMEOUT_SECS
}

fn default_connect_timeout() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
