//! Configuration for the terminal client.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root, without trailing slash
    pub api_url: String,
    /// Where the local snapshot is kept
    pub snapshot_path: PathBuf,
    /// Seconds between full refetches (0 disables resync)
    pub resync_secs: u64,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// `false` forces offline mode without contacting the API
    pub use_api: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_vars(|_| None)
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    #[must_use]
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_url: lookup("TODOLIST_API_URL")
                .unwrap_or_else(|| "http://localhost:3000/api".to_string()),
            snapshot_path: lookup("TODOLIST_SNAPSHOT_PATH")
                .map_or_else(|| PathBuf::from("todolist-snapshot.json"), PathBuf::from),
            resync_secs: lookup("TODOLIST_RESYNC_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            request_timeout_secs: lookup("TODOLIST_REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            use_api: lookup("TODOLIST_USE_API")
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
        }
    }

    /// Resync period, or `None` when disabled.
    #[must_use]
    pub const fn resync_interval(&self) -> Option<Duration> {
        match self.resync_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Timeout applied to every API request.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();

        assert_eq!(config.api_url, "http://localhost:3000/api");
        assert_eq!(config.snapshot_path, PathBuf::from("todolist-snapshot.json"));
        assert_eq!(config.resync_interval(), Some(Duration::from_secs(30)));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert!(config.use_api);
    }

    #[test]
    fn overrides_and_bad_values() {
        let vars: HashMap<&str, &str> = [
            ("TODOLIST_API_URL", "http://todo.internal/api"),
            ("TODOLIST_RESYNC_SECS", "0"),
            ("TODOLIST_REQUEST_TIMEOUT_SECS", "soon"),
            ("TODOLIST_USE_API", "false"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::from_vars(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.api_url, "http://todo.internal/api");
        assert_eq!(config.resync_interval(), None);
        assert_eq!(config.request_timeout_secs, 10);
        assert!(!config.use_api);
    }
}
