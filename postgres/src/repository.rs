//! `PostgreSQL` implementation of [`TodoRepository`].

use crate::config::PostgresConfig;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use todolist_core::repository::{RepositoryError, Result, TodoRepository};
use todolist_core::todo::{Todo, TodoId, TodoText, TodoUpdate};

const TODO_COLUMNS: &str = "id, text, completed, created_at, updated_at";

/// Row shape of the `todos` table.
#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
    id: i64,
    text: String,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: TodoId::new(row.id),
            text: row.text,
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn database_error(context: &'static str, error: &sqlx::Error) -> RepositoryError {
    metrics::counter!("postgres.todos.errors", "operation" => context).increment(1);
    RepositoryError::Database(format!("Failed to {context}: {error}"))
}

/// `PostgreSQL` todo repository.
///
/// Every write is a single statement, so each is atomic on its own. Updates
/// push `updated_at` strictly forward even when two writes land within the
/// same clock tick.
#[derive(Clone, Debug)]
pub struct PostgresTodoRepository {
    pool: PgPool,
}

impl PostgresTodoRepository {
    /// Open a connection pool using `config`.
    ///
    /// Migrations are not applied here; call [`Self::migrate`].
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if the database cannot be reached.
    pub async fn connect(config: &PostgresConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .connect(&config.url)
            .await
            .map_err(|e| RepositoryError::Database(format!("Failed to connect: {e}")))?;

        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            "PostgreSQL pool connected"
        );

        Ok(Self::from_pool(pool))
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Database`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("Migration failed: {e}")))?;

        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Get the underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl TodoRepository for PostgresTodoRepository {
    async fn list(&self) -> Result<Vec<Todo>> {
        let rows: Vec<TodoRow> = sqlx::query_as(&format!(
            "SELECT {TODO_COLUMNS} FROM todos ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| database_error("list todos", &e))?;

        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn get(&self, id: TodoId) -> Result<Todo> {
        let row: Option<TodoRow> =
            sqlx::query_as(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"))
                .bind(id.get())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| database_error("get todo", &e))?;

        row.map(Todo::from).ok_or(RepositoryError::NotFound { id })
    }

    async fn create(&self, text: TodoText) -> Result<Todo> {
        let row: TodoRow = sqlx::query_as(&format!(
            "INSERT INTO todos (text) VALUES ($1) RETURNING {TODO_COLUMNS}"
        ))
        .bind(text.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| database_error("create todo", &e))?;

        tracing::debug!(id = row.id, "Todo created");
        Ok(row.into())
    }

    async fn update(&self, id: TodoId, update: TodoUpdate) -> Result<Todo> {
        let row: Option<TodoRow> = sqlx::query_as(&format!(
            "UPDATE todos
             SET text = $1,
                 completed = $2,
                 updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond')
             WHERE id = $3
             RETURNING {TODO_COLUMNS}"
        ))
        .bind(update.text.as_str())
        .bind(update.completed)
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("update todo", &e))?;

        row.map(Todo::from).ok_or(RepositoryError::NotFound { id })
    }

    async fn set_completed(&self, id: TodoId, completed: bool) -> Result<Todo> {
        let row: Option<TodoRow> = sqlx::query_as(&format!(
            "UPDATE todos
             SET completed = $1,
                 updated_at = GREATEST(clock_timestamp(), updated_at + INTERVAL '1 microsecond')
             WHERE id = $2
             RETURNING {TODO_COLUMNS}"
        ))
        .bind(completed)
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| database_error("set completion", &e))?;

        row.map(Todo::from).ok_or(RepositoryError::NotFound { id })
    }

    async fn delete(&self, id: TodoId) -> Result<()> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("delete todo", &e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound { id });
        }

        tracing::debug!(id = %id, "Todo deleted");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| database_error("reach database", &e))?;
        Ok(())
    }
}
