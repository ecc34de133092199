//! Router assembly.
//!
//! ```text
//! GET    /health            liveness, plain "ok"
//! GET    /api/health        readiness (repository round trip)
//! GET    /api/todos         list
//! POST   /api/todos         create
//! GET    /api/todos/:id     get
//! PUT    /api/todos/:id     full update
//! PATCH  /api/todos/:id     completion flag only
//! DELETE /api/todos/:id     delete
//! ```

use crate::handlers::{health, todos};
use crate::state::AppState;
use axum::{
    Router,
    body::Body,
    http::{HeaderName, Request},
    routing::get,
};
use todolist_core::repository::TodoRepository;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// Routes of the todo resource, relative to `/api/todos`.
pub fn todo_routes<R>() -> Router<AppState<R>>
where
    R: TodoRepository + Clone + 'static,
{
    Router::new()
        .route("/", get(todos::list_todos::<R>).post(todos::create_todo::<R>))
        .route(
            "/:id",
            get(todos::get_todo::<R>)
                .put(todos::update_todo::<R>)
                .patch(todos::patch_todo::<R>)
                .delete(todos::delete_todo::<R>),
        )
}

/// Complete HTTP application over `repository`.
///
/// Every request gets an `x-request-id` (generated unless the caller sent
/// one), a tracing span carrying it, and the id echoed on the response.
pub fn app<R>(repository: R) -> Router
where
    R: TodoRepository + Clone + 'static,
{
    let request_id = HeaderName::from_static(crate::extractors::REQUEST_ID_HEADER);

    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
        let request_id = request
            .headers()
            .get(crate::extractors::REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            request_id = %request_id,
        )
    });

    Router::new()
        .route("/health", get(health::health_check))
        .route("/api/health", get(health::readiness::<R>))
        .nest("/api/todos", todo_routes::<R>())
        .with_state(AppState::new(repository))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(trace)
                .layer(PropagateRequestIdLayer::new(request_id))
                .layer(CorsLayer::permissive()),
        )
}
