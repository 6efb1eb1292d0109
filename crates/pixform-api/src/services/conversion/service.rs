use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use pixform_cloudconvert::RemoteConverter;
use pixform_core::{same_format, ConversionOptions};
use pixform_processing::{sanitize_filename, validate_options, ImageValidator};
use pixform_storage::{generate_output_name, TempFileGuard, TempFileStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use super::types::{
    ConversionError, ConversionOutcome, ConversionResult, RequestedOptions, Upload,
};
use crate::constants::DOWNLOAD_PREFIX;

/// Everything except RFC 3986 unreserved characters is escaped in the download segment
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Drives one conversion request from validated upload to downloadable artifact
#[derive(Clone)]
pub struct ConversionService {
    store: Arc<TempFileStore>,
    converter: Arc<dyn RemoteConverter>,
    validator: ImageValidator,
}

impl ConversionService {
    pub fn new(
        store: Arc<TempFileStore>,
        converter: Arc<dyn RemoteConverter>,
        validator: ImageValidator,
    ) -> Self {
        Self {
            store,
            converter,
            validator,
        }
    }

    /// Convert `upload` into `output_format`.
    ///
    /// Validation runs before anything touches the disk. The saved input is removed on
    /// every exit path; the output artifact survives only on success.
    #[tracing::instrument(
        skip(self, upload, requested),
        fields(filename = %upload.filename, size_bytes = upload.size(), output_format = %output_format)
    )]
    pub async fn convert(
        &self,
        upload: &Upload,
        output_format: &str,
        requested: RequestedOptions,
    ) -> Result<ConversionOutcome, ConversionError> {
        let start = Instant::now();

        // Step 1: size, input format (with content sniffing) and output format
        let (input_format, output_format) = self.validator.validate_all(
            &upload.filename,
            Some(upload.data.as_ref()),
            upload.size(),
            output_format,
        )?;

        // Step 2: optional quality / resize parameters
        let options = validate_options(requested.quality, requested.width, requested.height)?;

        // Step 3: nothing to do when the formats already match
        if same_format(&input_format, &output_format) {
            tracing::info!(
                input_format = %input_format,
                output_format = %output_format,
                "Skipping conversion, file already in requested format"
            );
            return Ok(ConversionOutcome::AlreadyInFormat {
                format: output_format,
            });
        }

        // Step 4: persist the upload under a generated name
        let input_path = self
            .store
            .save_upload(&upload.filename, upload.data.as_ref())
            .await?;
        let input_guard = TempFileGuard::new(input_path);

        // Step 5: remote conversion into a fresh artifact path
        let result = self
            .run_remote(
                &upload.filename,
                input_guard.path(),
                &output_format,
                &options,
            )
            .await;

        // Step 6: the input is never needed again
        self.store.delete(&input_guard.release()).await;

        let (output_filename, output_guard) = result?;
        let stored_name = output_guard
            .release()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        tracing::info!(
            output_filename = %output_filename,
            stored_name = %stored_name,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Conversion completed"
        );

        Ok(ConversionOutcome::Converted(ConversionResult {
            original_filename: upload.filename.clone(),
            download_url: download_url(&stored_name),
            output_filename,
            stored_name,
            input_format,
            output_format,
        }))
    }

    /// Returns the client-facing output name and a guard over the finished artifact.
    async fn run_remote(
        &self,
        original_filename: &str,
        input_path: &Path,
        output_format: &str,
        options: &ConversionOptions,
    ) -> Result<(String, TempFileGuard), ConversionError> {
        let output_filename =
            generate_output_name(&sanitize_filename(original_filename), output_format);
        let output_guard = TempFileGuard::new(self.store.output_path(&output_filename)?);

        if let Err(e) = self
            .converter
            .convert(input_path, output_format, options, output_guard.path())
            .await
        {
            tracing::error!(error = %e, "Remote conversion failed");
            self.store.delete(&output_guard.release()).await;
            return Err(e.into());
        }

        Ok((output_filename, output_guard))
    }
}

/// Reference to a stored artifact, safe to use verbatim as a link target
fn download_url(stored_name: &str) -> String {
    format!(
        "{}/{}",
        DOWNLOAD_PREFIX,
        utf8_percent_encode(stored_name, PATH_SEGMENT)
    )
}
