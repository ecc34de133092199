//! Local persistence of the two lists.
//!
//! The snapshot is the offline source of truth: it is rewritten after every
//! mutation and read back whenever the server cannot be used. Writes carry
//! the state revision they were taken at; a write older than the last one
//! accepted is discarded, so effects that finish out of order never roll
//! the file back.

use crate::types::Snapshot;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Errors from reading or writing a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Filesystem failure
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// File exists but does not hold a snapshot
    #[error("Snapshot is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Where snapshots are kept.
pub trait SnapshotStore: Clone + Send + Sync + 'static {
    /// The last accepted snapshot, or `None` if nothing was ever written.
    fn load(&self) -> impl Future<Output = Result<Option<Snapshot>, SnapshotError>> + Send;

    /// Persist `snapshot` unless a newer revision is already stored.
    ///
    /// Returns `false` when the write was discarded as stale.
    fn save(&self, snapshot: Snapshot) -> impl Future<Output = Result<bool, SnapshotError>> + Send;
}

/// JSON file written atomically (temp file, then rename).
#[derive(Clone, Debug)]
pub struct FileSnapshotStore {
    path: PathBuf,
    /// Revision of the last accepted write; the lock also serializes writers
    last_revision: Arc<Mutex<Option<u64>>>,
}

impl FileSnapshotStore {
    /// Store backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            last_revision: Arc::new(Mutex::new(None)),
        }
    }

    /// The snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn read(&self) -> Result<Option<Snapshot>, SnapshotError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }
}

impl SnapshotStore for FileSnapshotStore {
    async fn load(&self) -> Result<Option<Snapshot>, SnapshotError> {
        let mut last_revision = self.last_revision.lock().await;
        let snapshot = self.read().await?;

        if let Some(snapshot) = &snapshot {
            *last_revision = Some(last_revision.map_or(snapshot.revision, |r| r.max(snapshot.revision)));
        }

        Ok(snapshot)
    }

    async fn save(&self, snapshot: Snapshot) -> Result<bool, SnapshotError> {
        let mut last_revision = self.last_revision.lock().await;

        if last_revision.is_some_and(|last| snapshot.revision < last) {
            tracing::debug!(
                revision = snapshot.revision,
                last = ?*last_revision,
                "Discarding stale snapshot"
            );
            return Ok(false);
        }

        let bytes = serde_json::to_vec_pretty(&snapshot)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        *last_revision = Some(snapshot.revision);
        tracing::trace!(revision = snapshot.revision, path = %self.path.display(), "Snapshot written");
        Ok(true)
    }
}
