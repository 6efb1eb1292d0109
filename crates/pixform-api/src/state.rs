//! Shared application state

use pixform_cloudconvert::RemoteConverter;
use pixform_core::Config;
use pixform_processing::ImageValidator;
use pixform_storage::TempFileStore;
use std::sync::Arc;

use crate::services::conversion::ConversionService;

pub struct AppState {
    pub config: Config,
    pub store: Arc<TempFileStore>,
    pub conversion: ConversionService,
    /// Whether a usable remote API key is present
    pub api_configured: bool,
}

impl AppState {
    /// Wire the conversion service around an existing store and remote converter
    pub fn new(
        config: Config,
        store: Arc<TempFileStore>,
        converter: Arc<dyn RemoteConverter>,
    ) -> Self {
        let validator = ImageValidator::new(config.max_file_size_bytes());
        let conversion = ConversionService::new(store.clone(), converter, validator);
        let api_configured = config.api_configured();

        Self {
            config,
            store,
            conversion,
            api_configured,
        }
    }
}
