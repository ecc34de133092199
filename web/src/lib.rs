//! Axum HTTP API for todolist.
//!
//! This crate is the imperative shell around the todo repository: it parses
//! requests, validates input with the core rules, calls the
//! [`TodoRepository`](todolist_core::repository::TodoRepository), and maps
//! results to HTTP responses.
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an Axum handler
//! 2. **Extract data** from request (path id, JSON body, request id)
//! 3. **Validate** with `TodoText::parse` before any store access
//! 4. **Call the repository** (single-statement write or read)
//! 5. **Map result** to HTTP response or `{"error": ...}` envelope
//!
//! # Example
//!
//! ```ignore
//! use todolist_core::memory::InMemoryTodoRepository;
//!
//! let app = todolist_web::app(InMemoryTodoRepository::new());
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

// Re-export key types for convenience
pub use error::AppError;
pub use extractors::{JsonBody, RequestId, TodoIdPath};
pub use router::{app, todo_routes};
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
