//! In-memory snapshot store.

use crate::snapshot::{SnapshotError, SnapshotStore};
use crate::types::Snapshot;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// Mock snapshot store.
///
/// Applies the same stale-revision rule as the file store, and keeps every
/// accepted write so tests can inspect the history.
#[derive(Clone, Debug, Default)]
pub struct InMemorySnapshotStore {
    writes: Arc<Mutex<Vec<Snapshot>>>,
}

impl InMemorySnapshotStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that already holds `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            writes: Arc::new(Mutex::new(vec![snapshot])),
        }
    }

    /// The snapshot a `load` would return.
    #[must_use]
    pub fn latest(&self) -> Option<Snapshot> {
        self.writes
            .lock()
            .ok()
            .and_then(|writes| writes.last().cloned())
    }

    /// Number of accepted writes (including a seeded snapshot).
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.lock().map_or(0, |writes| writes.len())
    }
}

fn poisoned() -> SnapshotError {
    SnapshotError::Io(std::io::Error::other("snapshot lock poisoned"))
}

impl SnapshotStore for InMemorySnapshotStore {
    fn load(&self) -> impl Future<Output = Result<Option<Snapshot>, SnapshotError>> + Send {
        let result = self
            .writes
            .lock()
            .map(|writes| writes.last().cloned())
            .map_err(|_| poisoned());
        async move { result }
    }

    fn save(&self, snapshot: Snapshot) -> impl Future<Output = Result<bool, SnapshotError>> + Send {
        let result = self.writes.lock().map_err(|_| poisoned()).map(|mut writes| {
            let stale = writes
                .last()
                .is_some_and(|last| snapshot.revision < last.revision);
            if !stale {
                writes.push(snapshot);
            }
            !stale
        });
        async move { result }
    }
}
