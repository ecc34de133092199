//! Client against a real HTTP server backed by the in-memory repository.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::net::SocketAddr;
use std::time::Duration;
use todolist_client::{
    ClientAction, ClientEnvironment, ClientReducer, ClientState, FileSnapshotStore, HttpTodoApi,
    ItemRef, SnapshotStore, SyncMode, TodoApi,
};
use todolist_core::memory::InMemoryTodoRepository;
use todolist_runtime::Store;

type HttpStore = Store<
    ClientState,
    ClientAction,
    ClientEnvironment<HttpTodoApi, FileSnapshotStore>,
    ClientReducer<HttpTodoApi, FileSnapshotStore>,
>;

const SETTLE: Duration = Duration::from_secs(5);

async fn spawn_server(repository: InMemoryTodoRepository) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, todolist_web::app(repository))
            .await
            .unwrap();
    });
    addr
}

fn api_for(addr: SocketAddr) -> HttpTodoApi {
    HttpTodoApi::new(format!("http://{addr}/api"), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_full_lifecycle_through_http() {
    let repository = InMemoryTodoRepository::new();
    let addr = spawn_server(repository.clone()).await;
    let dir = tempfile::tempdir().unwrap();
    let snapshots = FileSnapshotStore::new(dir.path().join("snapshot.json"));

    let env = ClientEnvironment::connect(api_for(addr), snapshots.clone(), true, None).await;
    assert_eq!(env.mode, SyncMode::Online);
    let store: HttpStore = Store::new(ClientState::default(), ClientReducer::new(), env);

    store.send(ClientAction::Bootstrap).await.unwrap();
    store.settle(SETTLE).await.unwrap();

    store
        .send(ClientAction::Add { text: "  Buy milk ".to_string() })
        .await
        .unwrap();
    store.settle(SETTLE).await.unwrap();

    let id = store
        .state(|s| s.pending[0].id())
        .await
        .expect("create confirmed by server");
    assert_eq!(repository.len(), 1);

    store
        .send(ClientAction::Toggle { item: ItemRef::Id(id) })
        .await
        .unwrap();
    store.settle(SETTLE).await.unwrap();

    let state = store.state(Clone::clone).await;
    assert!(state.pending.is_empty());
    assert_eq!(state.completed[0].id(), Some(id));

    let server_view = api_for(addr).list().await.unwrap();
    assert!(server_view[0].completed);
    assert!(server_view[0].updated_at > server_view[0].created_at);

    let on_disk = snapshots.load().await.unwrap().unwrap();
    assert_eq!(on_disk.completed, state.completed);

    store
        .send(ClientAction::Remove { item: ItemRef::Id(id) })
        .await
        .unwrap();
    store.settle(SETTLE).await.unwrap();

    assert!(store.state(ClientState::is_empty).await);
    assert!(repository.is_empty());
}

#[tokio::test]
async fn test_server_validation_message_reaches_the_client() {
    let addr = spawn_server(InMemoryTodoRepository::new()).await;
    let api = api_for(addr);

    let error = api.create("   ").await.unwrap_err();

    assert_eq!(
        error.to_string(),
        "API error (status 400): Todo text is required and must be a non-empty string"
    );
    assert!(api.set_completed(todolist_core::todo::TodoId::new(9), true)
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_unhealthy_store_sends_client_offline() {
    let repository = InMemoryTodoRepository::new();
    repository.set_unavailable(true);
    let addr = spawn_server(repository).await;
    let dir = tempfile::tempdir().unwrap();

    let env = ClientEnvironment::connect(
        api_for(addr),
        FileSnapshotStore::new(dir.path().join("snapshot.json")),
        true,
        None,
    )
    .await;

    assert_eq!(env.mode, SyncMode::Offline);
}
