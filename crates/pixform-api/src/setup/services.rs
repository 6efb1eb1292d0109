//! Service construction

use crate::state::AppState;
use anyhow::{Context, Result};
use pixform_cloudconvert::CloudConvertClient;
use pixform_core::Config;
use pixform_storage::TempFileStore;
use std::sync::Arc;

/// Create the temp store and the CloudConvert client, then assemble the state
pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    let store = TempFileStore::new(config.temp_dir())
        .await
        .context("Failed to initialize temp store")?;
    tracing::info!(root = %store.root().display(), "Temp store ready");

    let client = CloudConvertClient::from_config(config);
    tracing::info!(
        api_url = %config.cloudconvert_api_url(),
        poll_interval_secs = config.poll_interval_secs(),
        conversion_timeout_secs = config.conversion_timeout_secs(),
        "CloudConvert client configured"
    );

    Ok(Arc::new(AppState::new(
        config.clone(),
        Arc::new(store),
        Arc::new(client),
    )))
}
