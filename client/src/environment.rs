//! Dependencies injected into the client reducer.

use crate::api::TodoApi;
use crate::snapshot::SnapshotStore;
use crate::types::SyncMode;
use std::time::Duration;

/// Everything the client reducer's effects need, fixed for the session.
#[derive(Clone, Debug)]
pub struct ClientEnvironment<A, P> {
    /// Todo API
    pub api: A,
    /// Local snapshot persistence
    pub snapshots: P,
    /// Resolved once at startup
    pub mode: SyncMode,
    /// Interval between full refetches; `None` disables resync
    pub resync_interval: Option<Duration>,
}

impl<A, P> ClientEnvironment<A, P>
where
    A: TodoApi,
    P: SnapshotStore,
{
    /// Environment with an explicit mode (no health check).
    #[must_use]
    pub const fn new(api: A, snapshots: P, mode: SyncMode, resync_interval: Option<Duration>) -> Self {
        Self {
            api,
            snapshots,
            mode,
            resync_interval,
        }
    }

    /// Resolve the sync mode and build the environment.
    ///
    /// With `use_api` the API's readiness endpoint is called once; the
    /// session is Online only if it answers healthy. The mode never changes
    /// afterwards.
    pub async fn connect(
        api: A,
        snapshots: P,
        use_api: bool,
        resync_interval: Option<Duration>,
    ) -> Self {
        let mode = if !use_api {
            tracing::info!("API disabled by configuration, running offline");
            SyncMode::Offline
        } else {
            match api.health().await {
                Ok(()) => {
                    tracing::info!("API reachable, running online");
                    SyncMode::Online
                },
                Err(error) => {
                    tracing::warn!(error = %error, "API unreachable, running offline");
                    SyncMode::Offline
                },
            }
        };

        Self::new(api, snapshots, mode, resync_interval)
    }

    /// True when mutations should be sent to the server.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.mode == SyncMode::Online
    }
}
