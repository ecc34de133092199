//! `PostgreSQL` todo repository for todolist.
//!
//! This crate provides the production [`TodoRepository`] backed by a single
//! `todos` table. It uses sqlx with a managed connection pool and supports:
//!
//! - Single-statement writes (each write is atomic on its own)
//! - Embedded migrations (`migrations/`)
//! - Connection pool tuning via [`PostgresConfig`]
//!
//! # Example
//!
//! ```ignore
//! use todolist_postgres::{PostgresConfig, PostgresTodoRepository};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PostgresConfig::new("postgres://localhost/todolist");
//!     let repo = PostgresTodoRepository::connect(&config).await?;
//!     repo.migrate().await?;
//!     Ok(())
//! }
//! ```
//!
//! [`TodoRepository`]: todolist_core::repository::TodoRepository

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod repository;

pub use config::PostgresConfig;
pub use repository::PostgresTodoRepository;
