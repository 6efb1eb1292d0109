use pixform_core::{is_supported_format, ConversionOptions, SUPPORTED_FORMATS};
use std::path::Path;

use crate::sniff::detect_mime;

/// Upper bound for requested resize width and height, in pixels
pub const MAX_RESIZE_DIMENSION: i64 = 10_000;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Validation failures for a conversion request
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error(
        "File too large. Maximum size is {}MB, got {}MB",
        megabytes(.max),
        megabytes(.size)
    )]
    PayloadTooLarge { size: usize, max: usize },

    #[error(
        "Unsupported file format: .{extension}. Supported formats: {}",
        SUPPORTED_FORMATS.join(", ")
    )]
    UnsupportedInputFormat { extension: String },

    #[error(
        "Unsupported output format: {format}. Supported formats: {}",
        SUPPORTED_FORMATS.join(", ")
    )]
    UnsupportedOutputFormat { format: String },

    #[error("File is not a valid image. Detected type: {mime}")]
    InvalidContent { mime: String },

    #[error("{0}")]
    InvalidParameter(String),
}

fn megabytes(bytes: &usize) -> f64 {
    (*bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}

/// Size gate for uploads
///
/// Format checks are free functions since they only depend on the static format set.
#[derive(Debug, Clone, Copy)]
pub struct ImageValidator {
    max_file_size: usize,
}

impl ImageValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    /// Validate upload size
    pub fn validate_size(&self, size: usize) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::PayloadTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Run size, input format and output format checks in that order.
    ///
    /// Returns the lower-cased `(input_format, output_format)` pair.
    pub fn validate_all(
        &self,
        filename: &str,
        content: Option<&[u8]>,
        size: usize,
        output_format: &str,
    ) -> Result<(String, String), ValidationError> {
        self.validate_size(size)?;
        let input_format = validate_input_format(filename, content)?;
        let output_format = validate_output_format(output_format)?;
        Ok((input_format, output_format))
    }
}

/// Lower-cased text after the last `.` of the final path component, without the dot.
///
/// Hidden names such as `.png` have no extension.
pub fn get_file_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Validate the input extension and, when bytes are available, that they look like an image.
///
/// Content that matches no known signature is accepted on the strength of the extension.
pub fn validate_input_format(
    filename: &str,
    content: Option<&[u8]>,
) -> Result<String, ValidationError> {
    let extension = get_file_extension(filename);

    if !is_supported_format(&extension) {
        return Err(ValidationError::UnsupportedInputFormat { extension });
    }

    if let Some(bytes) = content.filter(|b| !b.is_empty()) {
        match detect_mime(bytes) {
            Some(mime) if !mime.starts_with("image/") => {
                return Err(ValidationError::InvalidContent {
                    mime: mime.to_string(),
                });
            }
            Some(_) => {}
            None => {
                tracing::debug!(
                    filename = %filename,
                    extension = %extension,
                    "Could not determine content type, relying on extension"
                );
            }
        }
    }

    Ok(extension)
}

/// Validate a requested output format, returning it trimmed and lower-cased
pub fn validate_output_format(format: &str) -> Result<String, ValidationError> {
    let format = format.trim().to_lowercase();

    if !is_supported_format(&format) {
        return Err(ValidationError::UnsupportedOutputFormat { format });
    }

    Ok(format)
}

pub fn validate_quality(quality: i64) -> Result<u8, ValidationError> {
    if !(1..=100).contains(&quality) {
        return Err(ValidationError::InvalidParameter(
            "Quality must be between 1 and 100".to_string(),
        ));
    }
    Ok(quality as u8)
}

pub fn validate_resize_dimensions(
    width: Option<i64>,
    height: Option<i64>,
) -> Result<(Option<u32>, Option<u32>), ValidationError> {
    let check = |value: Option<i64>, label: &str| -> Result<Option<u32>, ValidationError> {
        match value {
            Some(v) if !(1..=MAX_RESIZE_DIMENSION).contains(&v) => {
                Err(ValidationError::InvalidParameter(format!(
                    "Resize {} must be between 1 and {}px",
                    label, MAX_RESIZE_DIMENSION
                )))
            }
            Some(v) => Ok(Some(v as u32)),
            None => Ok(None),
        }
    };

    Ok((check(width, "width")?, check(height, "height")?))
}

/// Validate raw optional parameters and build the typed options for the remote job
pub fn validate_options(
    quality: Option<i64>,
    width: Option<i64>,
    height: Option<i64>,
) -> Result<ConversionOptions, ValidationError> {
    let quality = quality.map(validate_quality).transpose()?;
    let (width, height) = validate_resize_dimensions(width, height)?;
    Ok(ConversionOptions {
        quality,
        width,
        height,
    })
}
