//! Configuration management for the todolist server.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use todolist_postgres::PostgresConfig;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// `PostgreSQL` settings; `None` runs on the in-memory repository
    pub database: Option<DatabaseConfig>,
    /// Expose Prometheus metrics on `/metrics`
    pub metrics_enabled: bool,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections in the pool
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout: u64,
    /// Apply pending migrations at startup
    pub run_migrations: bool,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    #[must_use]
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database = lookup("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            max_connections: lookup("DATABASE_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            min_connections: lookup("DATABASE_MIN_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            connect_timeout: lookup("DATABASE_CONNECT_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            run_migrations: lookup("DATABASE_RUN_MIGRATIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
        });

        Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: lookup("PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            database,
            metrics_enabled: lookup("METRICS_ENABLED")
                .and_then(|s| s.parse().ok())
                .unwrap_or(true),
            shutdown_timeout: lookup("SHUTDOWN_TIMEOUT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        }
    }

    /// `host:port` to listen on.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// How long in-flight requests get to finish after a shutdown signal.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

impl DatabaseConfig {
    /// Pool settings for the repository.
    #[must_use]
    pub fn postgres(&self) -> PostgresConfig {
        PostgresConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout: Duration::from_secs(self.connect_timeout),
            run_migrations: self.run_migrations,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_run_in_memory() {
        let config = config(&[]);

        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert!(config.database.is_none());
        assert!(config.metrics_enabled);
        assert_eq!(config.shutdown_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn database_settings() {
        let config = config(&[
            ("DATABASE_URL", "postgres://localhost/todos"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("DATABASE_RUN_MIGRATIONS", "false"),
            ("PORT", "not-a-port"),
        ]);

        let database = config.database.unwrap();
        let postgres = database.postgres();
        assert_eq!(postgres.url, "postgres://localhost/todos");
        assert_eq!(postgres.max_connections, 4);
        assert_eq!(postgres.min_connections, 1);
        assert_eq!(postgres.connect_timeout, Duration::from_secs(30));
        assert!(!postgres.run_migrations);
        assert_eq!(config.port, 3000);
    }
}
