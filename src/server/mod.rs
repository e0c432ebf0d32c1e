//! HTTP surface: the analyze API plus the static front end.

mod handlers;

pub use handlers::{AnalyzeQuery, AnalyzeResponse, FETCH_SUGGESTION, RATE_LIMIT_SUGGESTION};

use std::any::Any;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AnalyzeError;
use crate::source::AccountSource;
use crate::source::demo::DemoSource;
use crate::source::twitter::TwitterSource;

/// Sources shared by every request. Both are read-only.
#[derive(Clone)]
pub struct AppState {
    pub live: Arc<dyn AccountSource>,
    pub demo: Arc<dyn AccountSource>,
}

impl AppState {
    pub fn new(live: Arc<dyn AccountSource>, demo: Arc<dyn AccountSource>) -> Self {
        Self { live, demo }
    }

    /// Real provider from `config`, demo data from an unseeded generator.
    pub fn from_config(config: &Config) -> Result<Self> {
        let live = TwitterSource::new(config)?;
        Ok(Self::new(Arc::new(live), Arc::new(DemoSource::new())))
    }
}

pub fn router(state: AppState, public_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/api/analyze", get(handlers::missing_username))
        .route("/api/analyze/", get(handlers::missing_username))
        .route("/api/analyze/{username}", get(handlers::analyze))
        .fallback_service(ServeDir::new(public_dir.as_ref()))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `0.0.0.0:{port}` and serve until Ctrl+C.
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "server listening");

    axum::serve(listener, router(state, &config.public_dir))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

/// Resolves on Ctrl+C. Never resolves if the handler cannot be installed.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutting down"),
        Err(e) => {
            warn!(error = %e, "cannot listen for Ctrl+C; graceful shutdown disabled");
            std::future::pending::<()>().await;
        }
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "request handler panicked");
    AnalyzeError::Internal("Failed to fetch Twitter data".to_string()).into_response()
}
