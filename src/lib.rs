//! dumpthread: save a Nostr thread to the local filesystem
//!
//! This crate reconstructs a discussion thread from a decentralized relay network.
//! Starting from a root note and a handful of seed relays, it fetches the root and
//! every note referencing it, follows the relay hints embedded in those notes to
//! reach more relays, and writes each note exactly once as `<id>.json`.

pub mod config;
pub mod crawler;
pub mod output;
pub mod protocol;
pub mod relay;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for dumpthread operations
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Failed to write event {event_id}: {source}")]
    Persist {
        event_id: String,
        source: storage::PersistError,
    },

    #[error("Persistence worker terminated unexpectedly: {0}")]
    WorkerPanicked(String),

    #[error("Crawl cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid relay address: {0}")]
    InvalidRelay(String),
}

/// Errors raised while decoding protocol identifiers and messages
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Invalid bech32 identifier '{input}': {message}")]
    Bech32 { input: String, message: String },

    #[error("Unsupported identifier prefix '{0}' (expected note or nevent)")]
    UnsupportedPrefix(String),

    #[error("Invalid event id length: expected 32 bytes, got {0}")]
    InvalidIdLength(usize),

    #[error("Identifier '{0}' carries no event id")]
    MissingEventId(String),

    #[error("Malformed TLV entry in '{0}'")]
    MalformedTlv(String),

    #[error("Invalid relay message: {0}")]
    InvalidMessage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for dumpthread operations
pub type Result<T> = std::result::Result<T, DumpError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for protocol operations
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, ThreadFetcher};
pub use output::CrawlReport;
pub use protocol::{decode_root_id, Event, EventId, RootPointer};
pub use state::RelayOutcome;
