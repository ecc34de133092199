//! In-memory todo API.

use crate::api::{ApiError, TodoApi};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use todolist_core::Utc;
use todolist_core::todo::{Todo, TodoId, TodoText};

/// One request observed by [`MockTodoApi`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    /// `GET /todos`
    List,
    /// `POST /todos`
    Create(String),
    /// `PATCH /todos/:id`
    SetCompleted(TodoId, bool),
    /// `DELETE /todos/:id`
    Delete(TodoId),
    /// `GET /health`
    Health,
}

#[derive(Debug, Default)]
struct Server {
    /// Newest first, like the real list endpoint
    todos: Vec<Todo>,
    next_id: i64,
    calls: Vec<ApiCall>,
}

/// Mock todo API.
///
/// Behaves like the HTTP API backed by an empty store. Switching it offline
/// makes every call fail with [`ApiError::Transport`], as if the network
/// were down. Every call is recorded, including failed ones.
#[derive(Clone, Debug, Default)]
pub struct MockTodoApi {
    server: Arc<Mutex<Server>>,
    offline: Arc<AtomicBool>,
}

impl MockTodoApi {
    /// API with no todos.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// API whose store already holds `todos` (newest first).
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let next_id = todos.iter().map(|todo| todo.id.get()).max().unwrap_or(0);
        Self {
            server: Arc::new(Mutex::new(Server {
                todos,
                next_id,
                calls: Vec::new(),
            })),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Simulate losing (or regaining) the network.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Requests made so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.server
            .lock()
            .map(|server| server.calls.clone())
            .unwrap_or_default()
    }

    /// Todos currently held by the fake server.
    #[must_use]
    pub fn todos(&self) -> Vec<Todo> {
        self.server
            .lock()
            .map(|server| server.todos.clone())
            .unwrap_or_default()
    }

    fn with_server<T>(
        &self,
        call: ApiCall,
        f: impl FnOnce(&mut Server) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut server = self
            .server
            .lock()
            .map_err(|_| ApiError::Transport("mock lock poisoned".to_string()))?;
        server.calls.push(call);

        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection refused".to_string()));
        }
        f(&mut server)
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: "Todo not found".to_string(),
    }
}

impl TodoApi for MockTodoApi {
    fn list(&self) -> impl Future<Output = Result<Vec<Todo>, ApiError>> + Send {
        let result = self.with_server(ApiCall::List, |server| Ok(server.todos.clone()));
        async move { result }
    }

    fn create(&self, text: &str) -> impl Future<Output = Result<Todo, ApiError>> + Send {
        let result = self.with_server(ApiCall::Create(text.to_string()), |server| {
            let text = TodoText::parse(text).map_err(|e| ApiError::Status {
                status: 400,
                message: e.to_string(),
            })?;

            server.next_id += 1;
            let now = Utc::now();
            let todo = Todo {
                id: TodoId::new(server.next_id),
                text: text.into_inner(),
                completed: false,
                created_at: now,
                updated_at: now,
            };
            server.todos.insert(0, todo.clone());
            Ok(todo)
        });
        async move { result }
    }

    fn set_completed(
        &self,
        id: TodoId,
        completed: bool,
    ) -> impl Future<Output = Result<Todo, ApiError>> + Send {
        let result = self.with_server(ApiCall::SetCompleted(id, completed), |server| {
            let todo = server
                .todos
                .iter_mut()
                .find(|todo| todo.id == id)
                .ok_or_else(not_found)?;
            todo.completed = completed;
            todo.updated_at = Utc::now();
            Ok(todo.clone())
        });
        async move { result }
    }

    fn delete(&self, id: TodoId) -> impl Future<Output = Result<(), ApiError>> + Send {
        let result = self.with_server(ApiCall::Delete(id), |server| {
            let before = server.todos.len();
            server.todos.retain(|todo| todo.id != id);
            if server.todos.len() == before {
                Err(not_found())
            } else {
                Ok(())
            }
        });
        async move { result }
    }

    fn health(&self) -> impl Future<Output = Result<(), ApiError>> + Send {
        let result = self.with_server(ApiCall::Health, |_| Ok(()));
        async move { result }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_list_toggle_delete() {
        let api = MockTodoApi::new();

        let first = api.create("  first ").await.unwrap();
        let second = api.create("second").await.unwrap();
        assert_eq!(first.text, "first");
        assert_eq!(second.id, TodoId::new(2));

        let listed = api.list().await.unwrap();
        assert_eq!(listed[0].id, second.id);

        let done = api.set_completed(first.id, true).await.unwrap();
        assert!(done.completed);

        api.delete(first.id).await.unwrap();
        assert!(api.delete(first.id).await.unwrap_err().is_not_found());
        assert_eq!(api.todos().len(), 1);
    }

    #[tokio::test]
    async fn offline_api_fails_but_records_calls() {
        let api = MockTodoApi::new();
        api.set_offline(true);

        assert!(matches!(api.create("x").await, Err(ApiError::Transport(_))));
        assert!(api.health().await.is_err());
        assert_eq!(
            api.calls(),
            vec![ApiCall::Create("x".to_string()), ApiCall::Health]
        );
        assert!(api.todos().is_empty());
    }
}
