//! Client reducer running inside the runtime store, against mocks.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::time::Duration;
use todolist_client::mocks::{ApiCall, InMemorySnapshotStore, MockTodoApi};
use todolist_client::{
    ClientAction, ClientEnvironment, ClientReducer, ClientState, Entry, ItemRef, Snapshot,
    SyncMode, TodoApi,
};
use todolist_runtime::Store;

type TestStore = Store<
    ClientState,
    ClientAction,
    ClientEnvironment<MockTodoApi, InMemorySnapshotStore>,
    ClientReducer<MockTodoApi, InMemorySnapshotStore>,
>;

const SETTLE: Duration = Duration::from_secs(2);

async fn store_with(
    api: MockTodoApi,
    snapshots: InMemorySnapshotStore,
    resync: Option<Duration>,
) -> TestStore {
    let env = ClientEnvironment::connect(api, snapshots, true, resync).await;
    Store::new(ClientState::default(), ClientReducer::new(), env)
}

#[tokio::test]
async fn test_add_with_network_down_stays_pending_and_is_persisted() {
    let api = MockTodoApi::new();
    let snapshots = InMemorySnapshotStore::new();
    let store = store_with(api.clone(), snapshots.clone(), None).await;
    assert_eq!(store.environment().mode, SyncMode::Online);

    api.set_offline(true);
    store
        .send(ClientAction::Add { text: "Task A".to_string() })
        .await
        .unwrap();

    // Visible before any response
    let pending = store.state(|s| s.pending.clone()).await;
    assert_eq!(pending, vec![Entry::local("Task A")]);

    store.settle(SETTLE).await.unwrap();

    let state = store.state(Clone::clone).await;
    assert_eq!(state.pending, vec![Entry::local("Task A")]);
    assert!(state.last_error.is_some());

    let snapshot = snapshots.latest().expect("snapshot written");
    assert_eq!(snapshot.pending, vec![Entry::local("Task A")]);
    assert_eq!(snapshot.pending[0].id(), None);
}

#[tokio::test]
async fn test_unreachable_api_at_startup_runs_offline_from_snapshot() {
    let api = MockTodoApi::new();
    api.set_offline(true);
    let snapshots = InMemorySnapshotStore::with_snapshot(Snapshot {
        revision: 4,
        pending: vec![Entry::local("left over")],
        completed: vec![Entry::local("finished")],
    });
    let store = store_with(api.clone(), snapshots.clone(), Some(Duration::from_millis(10))).await;
    assert_eq!(store.environment().mode, SyncMode::Offline);

    store.send(ClientAction::Bootstrap).await.unwrap();
    store.settle(SETTLE).await.unwrap();

    let state = store.state(Clone::clone).await;
    assert_eq!(state.pending, vec![Entry::local("left over")]);
    assert_eq!(state.completed, vec![Entry::local("finished")]);

    // Offline sessions never talk to the API after the health check
    api.set_offline(false);
    store
        .send(ClientAction::Toggle { item: ItemRef::Local("left over".to_string()) })
        .await
        .unwrap();
    store.settle(SETTLE).await.unwrap();

    assert_eq!(api.calls(), vec![ApiCall::Health]);
    let snapshot = snapshots.latest().unwrap();
    assert_eq!(snapshot.revision, 5);
    assert!(snapshot.pending.is_empty());
    assert_eq!(snapshot.completed.len(), 2);
}

#[tokio::test]
async fn test_resync_picks_up_server_changes_until_shutdown() {
    let api = MockTodoApi::new();
    let store = store_with(
        api.clone(),
        InMemorySnapshotStore::new(),
        Some(Duration::from_millis(20)),
    )
    .await;

    store.send(ClientAction::Bootstrap).await.unwrap();

    // Another client adds a todo behind our back
    api.create("from elsewhere").await.unwrap();

    let mut seen = false;
    for _ in 0..100 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if store.state(|s| s.pending.len()).await == 1 {
            seen = true;
            break;
        }
    }
    assert!(seen, "resync never delivered the new todo");

    store.shutdown(SETTLE).await.unwrap();
    assert_eq!(store.pending_effects(), 0);
}

#[tokio::test]
async fn test_confirmations_are_broadcast_after_being_applied() {
    let store = store_with(MockTodoApi::new(), InMemorySnapshotStore::new(), None).await;
    let mut actions = store.subscribe_actions();

    store
        .send(ClientAction::Add { text: "Buy milk".to_string() })
        .await
        .unwrap();

    let observed = tokio::time::timeout(SETTLE, actions.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(observed, ClientAction::Created { .. }));

    let id = store.state(|s| s.pending[0].id()).await;
    assert!(id.is_some());
}
