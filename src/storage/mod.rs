//! Storage module for persisting thread events
//!
//! Each event is written as one file named `<id>.json` inside the output
//! directory. There is no index, manifest, or sub-directory structure.

mod fs;
mod traits;

pub use fs::{event_path, FsPersister};
pub use traits::{PersistError, PersistResult, Persister};

use std::path::Path;

/// Creates the output directory (and parents) if it does not exist
pub async fn prepare_output_dir(path: &Path) -> std::io::Result<()> {
    tokio::fs::create_dir_all(path).await
}
