//! HTTP access to the todo API.
//!
//! [`TodoApi`] is the seam the reducer's effects call through; production
//! code uses [`HttpTodoApi`], tests use `MockTodoApi`.

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use todolist_core::todo::{Todo, TodoId};

/// Errors that can occur when talking to the todo API
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Request never got a response (connection refused, timeout, ...)
    #[error("Request failed: {0}")]
    Transport(String),

    /// Server answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message from the `{"error": ...}` envelope, or the raw body
        message: String,
    },

    /// Response body could not be decoded
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// Readiness check reported the server cannot serve requests
    #[error("API unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    /// True for a 404 answer.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Operations the client needs from the todo API.
pub trait TodoApi: Clone + Send + Sync + 'static {
    /// `GET /todos`: every todo, newest first.
    fn list(&self) -> impl Future<Output = Result<Vec<Todo>, ApiError>> + Send;

    /// `POST /todos`.
    fn create(&self, text: &str) -> impl Future<Output = Result<Todo, ApiError>> + Send;

    /// `PATCH /todos/:id` with the new completion flag.
    fn set_completed(
        &self,
        id: TodoId,
        completed: bool,
    ) -> impl Future<Output = Result<Todo, ApiError>> + Send;

    /// `DELETE /todos/:id`.
    fn delete(&self, id: TodoId) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `GET /health`: succeeds only if the server can reach its store.
    fn health(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: String,
}

/// [`TodoApi`] over HTTP with `reqwest`.
#[derive(Clone, Debug)]
pub struct HttpTodoApi {
    client: Client,
    base_url: String,
}

impl HttpTodoApi {
    /// Client for the API rooted at `base_url` (e.g. `http://localhost:3000/api`).
    ///
    /// Every request is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Root every path is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Turn a non-success response into [`ApiError::Status`].
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error)
            .unwrap_or(body);

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

fn transport(error: &reqwest::Error) -> ApiError {
    ApiError::Transport(error.to_string())
}

impl TodoApi for HttpTodoApi {
    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self
            .client
            .get(self.url("/todos"))
            .send()
            .await
            .map_err(|e| transport(&e))?;

        Self::decode(Self::check(response).await?).await
    }

    async fn create(&self, text: &str) -> Result<Todo, ApiError> {
        let response = self
            .client
            .post(self.url("/todos"))
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(|e| transport(&e))?;

        Self::decode(Self::check(response).await?).await
    }

    async fn set_completed(&self, id: TodoId, completed: bool) -> Result<Todo, ApiError> {
        let response = self
            .client
            .patch(self.url(&format!("/todos/{id}")))
            .json(&json!({ "completed": completed }))
            .send()
            .await
            .map_err(|e| transport(&e))?;

        Self::decode(Self::check(response).await?).await
    }

    async fn delete(&self, id: TodoId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/todos/{id}")))
            .send()
            .await
            .map_err(|e| transport(&e))?;

        Self::check(response).await.map(|_| ())
    }

    async fn health(&self) -> Result<(), ApiError> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|e| transport(&e))?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(ApiError::Unavailable(format!(
                "readiness check returned {status}"
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let api = HttpTodoApi::new("http://localhost:3000/api/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.base_url(), "http://localhost:3000/api");
        assert_eq!(api.url("/todos/7"), "http://localhost:3000/api/todos/7");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        // Port 9 (discard) is closed on any sane test host
        let api = HttpTodoApi::new("http://127.0.0.1:9/api", Duration::from_millis(500)).unwrap();

        assert!(matches!(api.list().await, Err(ApiError::Transport(_))));
        assert!(api.health().await.is_err());
    }

    #[test]
    fn not_found_is_recognised() {
        let error = ApiError::Status {
            status: 404,
            message: "Todo not found".to_string(),
        };
        assert!(error.is_not_found());
        assert!(!ApiError::Transport("x".into()).is_not_found());
    }
}
