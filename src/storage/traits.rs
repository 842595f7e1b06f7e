//! Persistence traits and error types

use crate::protocol::Event;
use std::future::Future;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing one event
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Event id '{0}' cannot be used as a file name")]
    InvalidId(String),
}

/// Result type for persistence operations
pub type PersistResult<T> = Result<T, PersistError>;

/// Trait for event sinks
///
/// A persister writes one event at a time. It is owned by the persistence
/// worker task and never called concurrently.
pub trait Persister: Send + Sync + 'static {
    /// Writes `event` into `directory`
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - The path of the written file
    /// * `Err(PersistError)` - The event could not be serialized or written
    fn write(
        &self,
        event: &Event,
        directory: &Path,
    ) -> impl Future<Output = PersistResult<PathBuf>> + Send;
}
