//! TicketDesk session server.
//!
//! Wires configuration, the revocation store, and the Axum app together,
//! runs the background prune sweeper, and shuts down on Ctrl+C or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use ticketdesk_api::{build_app, build_state};
use ticketdesk_auth::RevocationSweeper;
use ticketdesk_core::clock::{Clock, SystemClock};
use ticketdesk_core::config::AppConfig;
use ticketdesk_core::error::AppError;

#[tokio::main]
async fn main() {
    let env = std::env::var("TICKETDESK_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting TicketDesk v{}", env!("CARGO_PKG_VERSION"));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let sweep_interval = config.revocation.sweep_interval_seconds;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = build_state(config, clock).await?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper_handle = if sweep_interval > 0 {
        let sweeper = RevocationSweeper::new(
            Arc::clone(&state.revocation_store),
            Duration::from_secs(sweep_interval),
        );
        Some(tokio::spawn(sweeper.run(shutdown_rx)))
    } else {
        tracing::info!("Revocation sweeper disabled");
        None
    };

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("TicketDesk server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if let Some(handle) = sweeper_handle {
        let _ = tokio::time::timeout(grace, handle).await;
    }

    tracing::info!("TicketDesk server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
