//! Server startup and graceful shutdown

use crate::state::AppState;
use anyhow::{Context, Result};
use axum::Router;
use pixform_core::Config;
use pixform_infra::CleanupService;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Start the server and the temp directory sweep, stopping both on shutdown
pub async fn start_server(config: &Config, state: Arc<AppState>, app: Router) -> Result<()> {
    let addr = format!("{}:{}", config.host(), config.server_port());
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let cancel = CancellationToken::new();
    let cleanup = Arc::new(CleanupService::new(
        state.store.clone(),
        Duration::from_secs(config.cleanup_interval_secs()),
        Duration::from_secs(config.cleanup_max_age_hours() * 3600),
    ));
    let cleanup_handle = cleanup.start(cancel.clone());

    tracing::info!(
        max_file_size_mb = config.max_file_size_mb(),
        cleanup_interval_secs = config.cleanup_interval_secs(),
        cleanup_max_age_hours = config.cleanup_max_age_hours(),
        delete_after_download = config.delete_after_download(),
        "Server ready and accepting connections"
    );

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    cancel.cancel();
    if let Err(e) = cleanup_handle.await {
        tracing::warn!(error = %e, "Cleanup task ended abnormally");
    }

    served.context("Server error")
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM
///
/// A signal that cannot be installed is logged and never fires; the other still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}
