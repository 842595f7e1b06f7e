use crate::protocol::Event;
use crate::storage::{PersistError, PersistResult, Persister};
use std::path::{Path, PathBuf};

/// Writes events as `<id>.json` files using the canonical JSON encoding
#[derive(Debug, Clone, Default)]
pub struct FsPersister;

impl FsPersister {
    pub fn new() -> Self {
        Self
    }
}

/// Returns the file path for an event id inside `directory`
///
/// Ids come from untrusted relays, so anything that is not plain hex is
/// refused rather than joined onto the path.
pub fn event_path(directory: &Path, id: &str) -> PersistResult<PathBuf> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PersistError::InvalidId(id.to_string()));
    }
    Ok(directory.join(format!("{}.json", id)))
}

impl Persister for FsPersister {
    async fn write(&self, event: &Event, directory: &Path) -> PersistResult<PathBuf> {
        let path = event_path(directory, &event.id)?;
        let json = event.to_canonical_json()?;
        tokio::fs::write(&path, json).await?;
        Ok(path)
    }
}
