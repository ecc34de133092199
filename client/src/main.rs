//! `todolist`: terminal client for the todolist API.
//!
//! Reads commands from stdin, keeps the lists in a [`Store`], and redraws
//! whenever a server response changes them. Logs go to stderr.

use std::time::Duration;
use todolist_client::command::{self, Command};
use todolist_client::render::render;
use todolist_client::{
    ClientAction, ClientConfig, ClientEnvironment, ClientReducer, ClientState, Entry,
    FileSnapshotStore, HttpTodoApi, SyncMode,
};
use todolist_runtime::Store;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type ClientStore = Store<
    ClientState,
    ClientAction,
    ClientEnvironment<HttpTodoApi, FileSnapshotStore>,
    ClientReducer<HttpTodoApi, FileSnapshotStore>,
>;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todolist=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::from_env();
    info!(
        api_url = %config.api_url,
        snapshot = %config.snapshot_path.display(),
        "Configuration loaded"
    );

    let api = HttpTodoApi::new(&config.api_url, config.request_timeout())?;
    let snapshots = FileSnapshotStore::new(&config.snapshot_path);
    let env =
        ClientEnvironment::connect(api, snapshots, config.use_api, config.resync_interval()).await;
    let mode = env.mode;

    let store: ClientStore = Store::new(ClientState::default(), ClientReducer::new(), env);
    let redraw = tokio::spawn(redraw_on_change(store.clone(), mode));

    println!("{}", command::HELP);
    store.send(ClientAction::Bootstrap).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let action = match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => {
                println!("{}", command::HELP);
                continue;
            },
            Ok(Command::List) => None,
            Ok(Command::Add(text)) => Some(ClientAction::Add { text }),
            Ok(Command::Toggle(n)) => item_at(&store, n)
                .await
                .map(|item| ClientAction::Toggle { item }),
            Ok(Command::Remove(n)) => item_at(&store, n)
                .await
                .map(|item| ClientAction::Remove { item }),
            Err(error) => {
                println!("{error}");
                continue;
            },
        };

        if let Some(action) = action {
            store.send(action).await?;
        }
        show(&store, mode).await;
    }

    redraw.abort();
    if let Err(error) = store.shutdown(SHUTDOWN_TIMEOUT).await {
        warn!(error = %error, "Requests still in flight at exit");
    }
    Ok(())
}

async fn item_at(store: &ClientStore, position: usize) -> Option<todolist_client::ItemRef> {
    let item = store
        .state(|state| state.item_at(position).map(Entry::item_ref))
        .await;
    if item.is_none() {
        println!("No item {position}");
    }
    item
}

async fn show(store: &ClientStore, mode: SyncMode) {
    let view = store.state(|state| render(state, mode)).await;
    println!("{view}");
}

/// Redraw whenever a server response or snapshot read lands.
async fn redraw_on_change(store: ClientStore, mode: SyncMode) {
    let mut actions = store.subscribe_actions();
    loop {
        match actions.recv().await {
            Ok(ClientAction::ResyncTick) => {},
            Ok(_) | Err(RecvError::Lagged(_)) => show(&store, mode).await,
            Err(RecvError::Closed) => break,
        }
    }
}
