//! HTTP surface for proposal-kit.
//!
//! Exposes the run registry over axum:
//!
//! - `POST /generate`: run a brief through the pipeline and wait for it
//! - `GET /api/progress`: progress snapshot for polling clients
//! - `/api/runs`: submit, list, fetch results of and cancel runs
//! - `GET /api/templates`: available pipeline templates
//! - `GET /`: the browser client with its progress poller

pub mod error;
mod handlers;

pub use error::{ApiError, ServerError};

use axum::routing::{get, post};
use axum::Router;
use pg_core::config::AppConfig;
use pg_core::engine::PipelineEngine;
use pg_core::stages::StageRegistry;
use pg_core::state::{ProgressReporter, RunRegistry};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<RunRegistry>,
    reporter: ProgressReporter,
    generate_timeout: Duration,
    poll_interval_ms: u64,
}

impl AppState {
    pub fn new(registry: Arc<RunRegistry>, generate_timeout: Duration) -> Self {
        Self {
            reporter: ProgressReporter::new(Arc::clone(&registry)),
            registry,
            generate_timeout,
            poll_interval_ms: 1000,
        }
    }

    /// State for a server built from loaded configuration, running the
    /// built-in stages.
    pub fn from_config(config: &AppConfig) -> Result<Self, ServerError> {
        let engine = PipelineEngine::new(StageRegistry::with_builtin(), config.templates.clone())?;
        let registry = RunRegistry::new(engine, config.global.retention.max_finished_runs);

        Ok(Self::new(
            Arc::new(registry),
            Duration::from_secs(config.global.server.generate_timeout_secs),
        )
        .with_poll_interval(config.global.poller.interval_ms))
    }

    /// Poll interval the web client uses.
    pub fn with_poll_interval(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    pub fn registry(&self) -> &Arc<RunRegistry> {
        &self.registry
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/generate", post(handlers::generate))
        .route("/api/progress", get(handlers::progress))
        .route("/api/templates", get(handlers::templates))
        .route(
            "/api/runs",
            get(handlers::list_runs).post(handlers::submit_run),
        )
        .route("/api/runs/{id}/result", get(handlers::run_result))
        .route("/api/runs/{id}/cancel", post(handlers::cancel_run))
        .with_state(state)
}

/// Bind `host:port`.
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, ServerError> {
    let addr = format!("{host}:{port}");
    TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve `state` on `listener` until `shutdown` resolves.
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let addr = listener
        .local_addr()
        .map_err(|source| ServerError::Bind {
            addr: "listener".to_string(),
            source,
        })?;
    info!(%addr, "Proposal server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|source| ServerError::Serve { addr, source })?;

    info!(%addr, "Proposal server stopped");
    Ok(())
}
