//! Application state for Axum handlers.

use todolist_core::repository::TodoRepository;

/// Application state shared across all HTTP handlers.
///
/// Handlers are stateless; the only shared piece is the repository handle,
/// which is cheap to clone (a pool or an `Arc`).
///
/// # Examples
///
/// ```ignore
/// use todolist_core::memory::InMemoryTodoRepository;
/// use todolist_web::AppState;
///
/// let state = AppState::new(InMemoryTodoRepository::new());
/// let app = todo_routes().with_state(state);
/// ```
#[derive(Clone, Debug)]
pub struct AppState<R> {
    repository: R,
}

impl<R> AppState<R>
where
    R: TodoRepository + Clone,
{
    /// Create a new application state.
    #[must_use]
    pub const fn new(repository: R) -> Self {
        Self { repository }
    }

    /// The todo repository.
    #[must_use]
    pub const fn repository(&self) -> &R {
        &self.repository
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todolist_core::memory::InMemoryTodoRepository;

    #[test]
    fn test_state_is_clone() {
        // Ensure AppState implements Clone (required for Axum)
        fn assert_clone<T: Clone + Send + Sync + 'static>() {}
        assert_clone::<AppState<InMemoryTodoRepository>>();
    }

    #[test]
    fn test_state_exposes_repository() {
        let state = AppState::new(InMemoryTodoRepository::new());
        assert!(state.repository().is_empty());
    }
}
