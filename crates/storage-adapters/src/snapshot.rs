//! JSON snapshots of the in-memory store, loaded at startup and written on
//! shutdown by the binary.

use std::path::Path;

use domains::{Notification, Post, User};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub posts: Vec<Post>,
    pub notifications: Vec<Notification>,
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("snapshot holds duplicate {field} '{value}'")]
    Duplicate { field: &'static str, value: String },
}

impl Snapshot {
    /// Returns `Ok(None)` when the file does not exist yet.
    pub async fn load(path: &Path) -> Result<Option<Self>, SnapshotError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes to a sibling temp file first, then renames over the target.
    pub async fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(self)?).await?;
        fs::rename(&tmp, path).await?;
        Ok(())
    }
}
