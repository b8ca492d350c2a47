//! Application setup and server configuration.

use std::time::Duration;

use anyhow::{Context, Result};
use axum::{extract::Extension, routing::get, Router};
use telegram_auth::TelegramAuth;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::server::routes::{health_handler, telegram_handler};
use crate::server::static_files::serve_login_page;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub telegram: TelegramAuth,
    /// Cancelled on shutdown; each request runs its workflow on a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(telegram: TelegramAuth, shutdown: CancellationToken) -> Self {
        Self { telegram, shutdown }
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(serve_login_page))
        .route("/telegram", get(telegram_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}

/// Bind the listening socket, logging the failure before returning it
pub async fn bind(addr: &str) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .inspect_err(|e| tracing::error!(error = %e, addr, "failed to bind"))
        .with_context(|| format!("Failed to bind to {}", addr))
}
