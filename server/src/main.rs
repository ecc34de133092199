//! `todolist-server`: the todo HTTP API.
//!
//! Runs on `PostgreSQL` when `DATABASE_URL` is set and on an in-memory
//! repository otherwise. See [`config::Config`] for every setting.

mod config;

use axum::{Router, routing::get};
use config::Config;
use std::future::IntoFuture;
use std::time::Duration;
use todolist_core::memory::InMemoryTodoRepository;
use todolist_core::repository::TodoRepository;
use todolist_postgres::PostgresTodoRepository;
use todolist_runtime::metrics::MetricsRecorder;
use tokio::signal;
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todolist=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting todolist server");

    let config = Config::from_env();
    info!(
        address = %config.bind_address(),
        database = config.database.is_some(),
        metrics = config.metrics_enabled,
        "Configuration loaded"
    );

    let metrics = if config.metrics_enabled {
        Some(MetricsRecorder::install()?)
    } else {
        None
    };

    match &config.database {
        Some(database) => {
            info!("Connecting to PostgreSQL...");
            let repository = PostgresTodoRepository::connect(&database.postgres()).await?;
            if database.run_migrations {
                repository.migrate().await?;
            }
            serve(&config, repository, metrics).await
        },
        None => {
            warn!("DATABASE_URL not set, todos are kept in memory only");
            serve(&config, InMemoryTodoRepository::new(), metrics).await
        },
    }
}

/// Bind, serve until a shutdown signal, then drain for at most the
/// configured timeout.
async fn serve<R>(
    config: &Config,
    repository: R,
    metrics: Option<MetricsRecorder>,
) -> anyhow::Result<()>
where
    R: TodoRepository + Clone + 'static,
{
    let mut app: Router = todolist_web::app(repository);
    if let Some(recorder) = metrics {
        app = app.route(
            "/metrics",
            get(move || {
                let recorder = recorder.clone();
                async move { recorder.render() }
            }),
        );
    }

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(address = %address, "Server listening");

    let (signalled, drain_started) = oneshot::channel::<()>();
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = signalled.send(());
        })
        .into_future();

    let timeout = config.shutdown_timeout();
    tokio::select! {
        result = server => result?,
        () = drain_deadline(drain_started, timeout) => {
            warn!(timeout_secs = timeout.as_secs(), "Shutdown timeout elapsed, closing open connections");
        },
    }

    info!("Server stopped");
    Ok(())
}

/// Completes `timeout` after the shutdown signal; never without it.
async fn drain_deadline(drain_started: oneshot::Receiver<()>, timeout: Duration) {
    if drain_started.await.is_ok() {
        tokio::time::sleep(timeout).await;
    } else {
        std::future::pending::<()>().await;
    }
}

/// Graceful shutdown signal handler.
///
/// Waits for:
/// - Ctrl+C (SIGINT)
/// - SIGTERM (in production environments)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
