//! # todolist client
//!
//! Terminal client for the todolist API with an optimistic local cache.
//!
//! The [`ClientReducer`] keeps two lists (pending and completed) in
//! [`ClientState`]. User actions change the lists immediately; when the API
//! is reachable they are mirrored to the server, otherwise the client works
//! from a local snapshot file. A periodic resync replaces the cache with the
//! server's view.
//!
//! ## Example
//!
//! ```ignore
//! use todolist_client::{ClientEnvironment, ClientReducer, ClientState, ClientAction};
//! use todolist_runtime::Store;
//!
//! let env = ClientEnvironment::connect(api, snapshots, true, Some(interval)).await;
//! let store = Store::new(ClientState::default(), ClientReducer::new(), env);
//! store.send(ClientAction::Bootstrap).await?;
//! ```

pub mod api;
pub mod command;
pub mod config;
pub mod environment;
pub mod reducer;
pub mod render;
pub mod snapshot;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mocks;

pub use api::{ApiError, HttpTodoApi, TodoApi};
pub use command::Command;
pub use config::ClientConfig;
pub use environment::ClientEnvironment;
pub use reducer::ClientReducer;
pub use snapshot::{FileSnapshotStore, SnapshotError, SnapshotStore};
pub use types::{ClientAction, ClientState, Entry, ItemRef, LocalTodo, Snapshot, SyncMode};
