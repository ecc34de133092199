//! Test doubles for the client environment.

mod api;
mod snapshot;

pub use api::{ApiCall, MockTodoApi};
pub use snapshot::InMemorySnapshotStore;
