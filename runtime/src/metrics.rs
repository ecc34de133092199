//! Prometheus metrics for observability and monitoring.
//!
//! This module installs the process-wide Prometheus recorder and describes the
//! metrics every todolist component emits:
//! - Store reducer execution and effects
//! - HTTP todo operations
//!
//! # Example
//!
//! ```rust,no_run
//! use todolist_runtime::metrics::MetricsRecorder;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let recorder = MetricsRecorder::install()?;
//!
//! // Serve this body from GET /metrics
//! let body = recorder.render();
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;

// Re-export metrics macros for use in other crates
pub use metrics::{counter, histogram};

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Handle onto the installed Prometheus recorder.
///
/// Cheap to clone; every clone renders the same registry.
#[derive(Clone)]
pub struct MetricsRecorder {
    handle: PrometheusHandle,
}

impl MetricsRecorder {
    /// Describe all metrics and install the global Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Install`] if a recorder is already installed in
    /// this process, or [`MetricsError::Build`] if the bucket layout is rejected.
    pub fn install() -> Result<Self, MetricsError> {
        let builder = Self::builder()?;

        let handle = builder
            .install_recorder()
            .map_err(|e| MetricsError::Install(e.to_string()))?;

        register_metrics();
        tracing::info!("Prometheus metrics recorder installed");

        Ok(Self { handle })
    }

    /// Build a recorder without installing it globally.
    ///
    /// The returned recorder only sees metrics emitted inside
    /// [`metrics::with_local_recorder`].
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Build`] if the bucket layout is rejected.
    pub fn local() -> Result<(Self, metrics_exporter_prometheus::PrometheusRecorder), MetricsError>
    {
        let recorder = Self::builder()?.build_recorder();
        let handle = recorder.handle();
        Ok((Self { handle }, recorder))
    }

    fn builder() -> Result<PrometheusBuilder, MetricsError> {
        PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))
    }

    /// Render current metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRecorder").finish_non_exhaustive()
    }
}

/// Register all metric descriptions.
fn register_metrics() {
    // Store
    describe_counter!("store.actions.total", "Total number of actions sent to a store");
    describe_counter!("store.effects.executed", "Effects executed, labelled by type");
    describe_histogram!(
        "store.reducer.duration_seconds",
        "Time spent inside the reducer per action"
    );
    describe_counter!("store.shutdown.initiated", "Store shutdowns started");
    describe_counter!("store.shutdown.completed", "Store shutdowns that drained in time");
    describe_counter!("store.shutdown.timeout", "Store shutdowns that timed out");
    describe_counter!(
        "store.shutdown.rejected_actions",
        "Actions rejected because the store was shutting down"
    );

    // HTTP API
    describe_counter!(
        "http.todos.requests",
        "Todo API requests, labelled by operation and outcome"
    );
    describe_histogram!(
        "http.todos.duration_seconds",
        "Todo API handler latency, labelled by operation"
    );
}

/// HTTP todo API metrics recorder.
pub struct HttpMetrics;

impl HttpMetrics {
    /// Record one handled request.
    pub fn record_request(operation: &'static str, outcome: &'static str, duration: Duration) {
        counter!("http.todos.requests", "operation" => operation, "outcome" => outcome)
            .increment(1);
        histogram!("http.todos.duration_seconds", "operation" => operation)
            .record(duration.as_secs_f64());
    }
}
