//! Health check endpoints.
//!
//! These endpoints are used by load balancers, monitoring systems, and the
//! client (which calls readiness once at startup to pick Online or Offline).

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use std::time::Instant;
use todolist_core::repository::TodoRepository;
use todolist_runtime::HealthCheck;

/// Simple health check endpoint (for basic liveness).
///
/// Returns 200 OK to indicate the service is running.
/// This endpoint does NOT check dependencies (database, etc.).
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness check: round trip to the repository.
///
/// # Status Codes
///
/// - 200 OK: the repository answered
/// - 503 Service Unavailable: the repository could not be reached
///
/// # Endpoint
///
/// ```text
/// GET /api/health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "component": "database",
///   "status": "Healthy",
///   "metadata": { "latency_ms": "2" }
/// }
/// ```
pub async fn readiness<R>(State(state): State<AppState<R>>) -> (StatusCode, Json<HealthCheck>)
where
    R: TodoRepository + Clone,
{
    let started = Instant::now();

    let check = match state.repository().ping().await {
        Ok(()) => {
            let latency = started.elapsed().as_millis().to_string();
            HealthCheck::healthy("database").with_metadata("latency_ms", latency)
        },
        Err(error) => {
            tracing::warn!(error = %error, "Readiness check failed");
            HealthCheck::unhealthy("database", error.to_string())
        },
    };

    let status = if check.status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(check))
}
