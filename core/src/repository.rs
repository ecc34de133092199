//! Todo repository trait.
//!
//! The HTTP API is written against this contract; PostgreSQL and in-memory
//! implementations live in their own crates.

use crate::todo::{Todo, TodoId, TodoText, TodoUpdate};
use std::future::Future;
use thiserror::Error;

/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Failures a repository can report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No record with this identifier.
    #[error("Todo {id} not found")]
    NotFound {
        /// Identifier that was looked up
        id: TodoId,
    },

    /// The backing store failed or could not be reached.
    #[error("Database error: {0}")]
    Database(String),
}

impl RepositoryError {
    /// True for the not-found case.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Durable table of todo records.
///
/// Every write targets a single record and is atomic on its own; there is no
/// cross-call transaction. Concurrent writes to the same record are
/// last-write-wins.
pub trait TodoRepository: Send + Sync {
    /// All todos, newest first (`created_at` descending, ties by id descending).
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the store fails.
    fn list(&self) -> impl Future<Output = Result<Vec<Todo>>> + Send;

    /// A single todo.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::NotFound`] if no record has this id
    /// - [`RepositoryError::Database`] if the store fails
    fn get(&self, id: TodoId) -> impl Future<Output = Result<Todo>> + Send;

    /// Insert a new pending todo; the store assigns id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the store fails.
    fn create(&self, text: TodoText) -> impl Future<Output = Result<Todo>> + Send;

    /// Replace text and completion flag, refreshing `updated_at`.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::NotFound`] if no record has this id (nothing is created)
    /// - [`RepositoryError::Database`] if the store fails
    fn update(&self, id: TodoId, update: TodoUpdate) -> impl Future<Output = Result<Todo>> + Send;

    /// Set only the completion flag, refreshing `updated_at`.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::NotFound`] if no record has this id (nothing is created)
    /// - [`RepositoryError::Database`] if the store fails
    fn set_completed(
        &self,
        id: TodoId,
        completed: bool,
    ) -> impl Future<Output = Result<Todo>> + Send;

    /// Delete a todo. Its id is never handed out again.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::NotFound`] if no record has this id
    /// - [`RepositoryError::Database`] if the store fails
    fn delete(&self, id: TodoId) -> impl Future<Output = Result<()>> + Send;

    /// Cheap round trip used by readiness checks.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the store cannot be reached.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;
}
