use async_trait::async_trait;
use pixform_core::ConversionOptions;
use std::path::Path;

use crate::error::RemoteError;

/// Converts one local file into another format via an external service.
///
/// On success the converted bytes have been fully written to `output`. On failure
/// `output` may hold a partial file; removing it is the caller's job.
#[async_trait]
pub trait RemoteConverter: Send + Sync {
    async fn convert(
        &self,
        input: &Path,
        output_format: &str,
        options: &ConversionOptions,
        output: &Path,
    ) -> Result<(), RemoteError>;
}
