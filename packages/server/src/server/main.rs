// Main entry point for the demo login server

use anyhow::{Context, Result};
use server_core::{
    server::{bind, build_app, AppState},
    Config,
};
use telegram_auth::TelegramAuth;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,telegram_auth=debug,server_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Telegram login demo server");

    // Load configuration
    let config = Config::from_env()
        .inspect_err(|e| tracing::error!(error = %format!("{:#}", e), "invalid configuration"))
        .context("Failed to load configuration")?;
    tracing::info!(
        bot_id = config.telegram.bot_id,
        domain = %config.telegram.domain,
        "Configuration loaded"
    );

    // Root shutdown token: stops the session reaper and cancels in-flight workflows
    let shutdown = CancellationToken::new();
    let telegram = TelegramAuth::with_shutdown(config.telegram.clone(), shutdown.child_token())
        .inspect_err(|e| tracing::error!(error = %e, "failed to create Telegram auth client"))
        .context("Failed to create Telegram auth client")?;

    let app = build_app(
        AppState::new(telegram, shutdown.clone()),
        config.request_timeout,
    );

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Login page: http://localhost:{}/", config.port);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = bind(&addr).await?;

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("received shutdown signal");
            signal.cancel();
        })
        .await
        .inspect_err(|e| tracing::error!(error = %e, "server error"))
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}
