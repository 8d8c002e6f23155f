//! core::store
//!
//! Anthology snapshot persistence.
//!
//! # Architecture
//!
//! The anthology persists as `anthology.json` in the workspace admin
//! directory: three top-level arrays (`projects`, `binaries`,
//! `packages`), each in the graph's stable sort order, pretty-printed so
//! snapshots diff cleanly under version control.
//!
//! Loading a missing file yields an empty graph — a fresh workspace has
//! no snapshot yet and that is not an error. A present-but-malformed
//! file *is* an error; silently discarding an existing snapshot would
//! lose the merge base.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::anthology::Anthology;

/// File name of the persisted snapshot inside the admin directory.
pub const ANTHOLOGY_FILE: &str = "anthology.json";

/// Errors from snapshot storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The snapshot file exists but could not be parsed.
    #[error("failed to parse snapshot {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The graph could not be serialized.
    #[error("failed to serialize snapshot: {0}")]
    Serialize(serde_json::Error),

    /// Filesystem failure reading or writing the snapshot.
    #[error("snapshot I/O error at {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Snapshot store rooted at an admin directory.
#[derive(Debug, Clone)]
pub struct AnthologyStore {
    admin_dir: PathBuf,
}

impl AnthologyStore {
    /// Create a store rooted at the given admin directory.
    pub fn new(admin_dir: impl Into<PathBuf>) -> Self {
        Self {
            admin_dir: admin_dir.into(),
        }
    }

    /// Path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.admin_dir.join(ANTHOLOGY_FILE)
    }

    /// Load the persisted anthology.
    ///
    /// A missing file yields an empty graph.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Parse`] if the file exists but is malformed
    /// - [`StoreError::Io`] for filesystem failures other than not-found
    pub fn load(&self) -> Result<Anthology, StoreError> {
        let path = self.snapshot_path();
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Anthology::new()),
            Err(e) => {
                return Err(StoreError::Io {
                    path,
                    source: e,
                })
            }
        };
        serde_json::from_str(&json).map_err(|source| StoreError::Parse { path, source })
    }

    /// Persist the anthology, creating the admin directory if needed.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Serialize`] if the graph cannot be serialized
    /// - [`StoreError::Io`] for filesystem failures
    pub fn save(&self, anthology: &Anthology) -> Result<(), StoreError> {
        fs::create_dir_all(&self.admin_dir).map_err(|source| StoreError::Io {
            path: self.admin_dir.clone(),
            source,
        })?;

        let json = serde_json::to_string_pretty(anthology).map_err(StoreError::Serialize)?;
        let path = self.snapshot_path();
        write_with_newline(&path, &json).map_err(|source| StoreError::Io { path, source })
    }
}

fn write_with_newline(path: &Path, json: &str) -> io::Result<()> {
    fs::write(path, format!("{json}\n"))
}
