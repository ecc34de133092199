//! In-memory todo repository.
//!
//! Serves the API when no database is configured, and backs the HTTP tests.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use crate::environment::{Clock, SystemClock};
use crate::repository::{RepositoryError, Result, TodoRepository};
use crate::todo::{Todo, TodoId, TodoText, TodoUpdate};

#[derive(Debug)]
struct Table {
    rows: BTreeMap<TodoId, Todo>,
    next_id: i64,
    last_stamp: Option<DateTime<Utc>>,
}

impl Table {
    /// Next write timestamp: the clock's time, pushed forward if needed so
    /// that stamps never repeat or go backwards.
    fn stamp(&mut self, clock: &dyn Clock) -> DateTime<Utc> {
        let now = clock.now();
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

/// Todo repository held in process memory.
///
/// Nothing survives a restart. Otherwise it keeps the same contract as the
/// PostgreSQL repository: ids start at 1 and are never reused, `updated_at` strictly
/// increases on every write, and listing is newest first.
#[derive(Clone)]
pub struct InMemoryTodoRepository {
    table: Arc<Mutex<Table>>,
    clock: Arc<dyn Clock>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryTodoRepository {
    /// Create an empty repository on the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create an empty repository stamping records with `clock`.
    #[must_use]
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            table: Arc::new(Mutex::new(Table {
                rows: BTreeMap::new(),
                next_id: 1,
                last_stamp: None,
            })),
            clock: Arc::new(clock),
            unavailable: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Simulate an unreachable database: every call fails with
    /// [`RepositoryError::Database`] until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored todos.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.lock().map_or(0, |table| table.rows.len())
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(RepositoryError::Database("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn with_table<T>(&self, f: impl FnOnce(&mut Table, &dyn Clock) -> Result<T>) -> Result<T> {
        self.check_available()?;
        let mut table = self
            .table
            .lock()
            .map_err(|_| RepositoryError::Database("table lock poisoned".to_string()))?;
        f(&mut table, self.clock.as_ref())
    }
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryTodoRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTodoRepository")
            .field("len", &self.len())
            .field("unavailable", &self.unavailable.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl TodoRepository for InMemoryTodoRepository {
    fn list(&self) -> impl Future<Output = Result<Vec<Todo>>> + Send {
        let result = self.with_table(|table, _| {
            let mut todos: Vec<Todo> = table.rows.values().cloned().collect();
            todos.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            });
            Ok(todos)
        });

        async move { result }
    }

    fn get(&self, id: TodoId) -> impl Future<Output = Result<Todo>> + Send {
        let result = self.with_table(|table, _| {
            table
                .rows
                .get(&id)
                .cloned()
                .ok_or(RepositoryError::NotFound { id })
        });

        async move { result }
    }

    fn create(&self, text: TodoText) -> impl Future<Output = Result<Todo>> + Send {
        let result = self.with_table(|table, clock| {
            let id = TodoId::new(table.next_id);
            table.next_id += 1;

            let now = table.stamp(clock);
            let todo = Todo {
                id,
                text: text.into_inner(),
                completed: false,
                created_at: now,
                updated_at: now,
            };
            table.rows.insert(id, todo.clone());
            Ok(todo)
        });

        async move { result }
    }

    fn update(&self, id: TodoId, update: TodoUpdate) -> impl Future<Output = Result<Todo>> + Send {
        let result = self.with_table(|table, clock| {
            if !table.rows.contains_key(&id) {
                return Err(RepositoryError::NotFound { id });
            }

            let now = table.stamp(clock);
            let todo = table
                .rows
                .get_mut(&id)
                .ok_or(RepositoryError::NotFound { id })?;
            todo.text = update.text.into_inner();
            todo.completed = update.completed;
            todo.updated_at = now;
            Ok(todo.clone())
        });

        async move { result }
    }

    fn set_completed(
        &self,
        id: TodoId,
        completed: bool,
    ) -> impl Future<Output = Result<Todo>> + Send {
        let result = self.with_table(|table, clock| {
            if !table.rows.contains_key(&id) {
                return Err(RepositoryError::NotFound { id });
            }

            let now = table.stamp(clock);
            let todo = table
                .rows
                .get_mut(&id)
                .ok_or(RepositoryError::NotFound { id })?;
            todo.completed = completed;
            todo.updated_at = now;
            Ok(todo.clone())
        });

        async move { result }
    }

    fn delete(&self, id: TodoId) -> impl Future<Output = Result<()>> + Send {
        let result = self.with_table(|table, _| {
            table
                .rows
                .remove(&id)
                .map(|_| ())
                .ok_or(RepositoryError::NotFound { id })
        });

        async move { result }
    }

    fn ping(&self) -> impl Future<Output = Result<()>> + Send {
        let result = self.check_available();
        async move { result }
    }
}
