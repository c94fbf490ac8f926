//! Read-only status endpoint served over HTTP.

use crate::AppState;
use anyhow::Result;
use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tokio::sync::oneshot;

/// Snapshot returned by `GET /health`.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub status: &'static str,
    pub uptime: String,
    pub messages: u64,
    pub errors: u64,
    pub llm_provider: String,
    pub llm_model: String,
    pub llm_healthy: bool,
}

impl StatusReport {
    /// Collect a report from the shared state without probing anything.
    pub fn collect(state: &AppState) -> Self {
        let current = state.manager.current_provider();
        let (provider, model, healthy) = match current {
            Some(p) => (p.name.to_string(), p.model.to_string(), p.healthy),
            None => ("none".to_owned(), "none".to_owned(), false),
        };
        Self {
            status: "ok",
            uptime: state.uptime(),
            messages: state.messages(),
            errors: state.errors(),
            llm_provider: provider,
            llm_model: model,
            llm_healthy: healthy,
        }
    }
}

/// Build the status router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(state)
}

async fn root() -> &'static str {
    "relayd is running. GET /health for status.\n"
}

async fn health(State(state): State<AppState>) -> Json<StatusReport> {
    Json(StatusReport::collect(&state))
}

/// Handle returned by [`serve`]: holds the bound port and shutdown trigger.
pub struct ServeHandle {
    /// The port the status server is listening on.
    pub port: u16,
    /// Send a value to trigger graceful shutdown.
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// Join handle for the server task.
    join: Option<tokio::task::JoinHandle<Result<(), std::io::Error>>>,
}

impl ServeHandle {
    /// Trigger graceful shutdown and wait for the server to stop.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            join.await??;
        }
        Ok(())
    }
}

/// Bind the axum server and start serving in a spawned task.
///
/// Binding port 0 picks a free port; the bound port is reported in the
/// returned handle.
pub async fn serve(state: AppState, bind: &str) -> Result<ServeHandle> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    let port = listener.local_addr()?.port();
    tracing::info!("status server listening on {bind} (port {port})");

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("status server shutting down");
            })
            .await
    });

    Ok(ServeHandle {
        port,
        shutdown_tx: Some(shutdown_tx),
        join: Some(join),
    })
}
