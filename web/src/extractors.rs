//! Custom Axum extractors.
//!
//! This module contains custom extractors for the todo API:
//! - `TodoIdPath`: Parse the `:id` path segment; anything unparsable is a 404
//! - `JsonBody`: JSON body whose rejections use the `{"error": ...}` envelope
//! - `RequestId`: The `x-request-id` assigned by the request-id layer
//!
//! # Examples
//!
//! ```ignore
//! async fn handler(
//!     request_id: RequestId,
//!     TodoIdPath(id): TodoIdPath,
//!     JsonBody(body): JsonBody<PatchTodoRequest>,
//! ) -> WebResult<Json<Todo>> {
//!     tracing::info!(request_id = %request_id.0, id = %id, "Patching todo");
//!     ...
//! }
//! ```

use crate::error::AppError;
use axum::{
    Json, async_trait,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use todolist_core::todo::TodoId;

/// Header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Todo identifier taken from the `:id` path segment.
///
/// An id that does not parse is indistinguishable from one that does not
/// exist: both are rejected with 404 `Todo not found`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoIdPath(pub TodoId);

#[async_trait]
impl<S> FromRequestParts<S> for TodoIdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::not_found())?;

        raw.parse::<TodoId>()
            .map(Self)
            .map_err(|_| AppError::not_found())
    }
}

/// JSON request body.
///
/// Wraps [`axum::Json`] so malformed bodies, wrong content types, and type
/// mismatches become 400 `Invalid request body: <detail>`.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| {
                AppError::validation(format!("Invalid request body: {}", rejection.body_text()))
            })
    }
}

/// Request id for log correlation.
///
/// Reads the `x-request-id` header, which the router's request-id layer
/// sets on every request; falls back to `-` when the layer is absent.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RequestId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-")
            .to_string();

        Ok(Self(request_id))
    }
}
