//! Application setup and initialization
//!
//! Everything main.rs needs to go from a loaded `Config` to a running server.

pub mod routes;
pub mod server;
pub mod services;

use crate::state::AppState;
use anyhow::{Context, Result};
use pixform_core::{Config, SUPPORTED_FORMATS};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    pixform_infra::init_telemetry(config.log_json())
        .context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment(),
        temp_dir = %config.temp_dir().display(),
        max_file_size_mb = config.max_file_size_mb(),
        supported_formats = %SUPPORTED_FORMATS.join(","),
        "Configuration loaded and validated successfully"
    );

    if !config.api_configured() {
        tracing::warn!(
            "CLOUDCONVERT_API_KEY is not set; conversions will fail until a key is configured"
        );
    }

    let state = services::initialize_services(&config).await?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
