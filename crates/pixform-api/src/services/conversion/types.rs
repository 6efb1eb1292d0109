use bytes::Bytes;
use pixform_cloudconvert::RemoteError;
use pixform_processing::ValidationError;
use pixform_storage::StorageError;

/// A file received from the client, fully buffered
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub data: Bytes,
}

impl Upload {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Optional conversion parameters as sent by the client, not yet range-checked
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestedOptions {
    pub quality: Option<i64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
}

/// A finished conversion whose artifact is waiting in the temp store
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub original_filename: String,
    /// Name offered to the client, `{stem}_converted.{format}`
    pub output_filename: String,
    /// On-disk name inside the temp root, `{uuid}_{output_filename}`
    pub stored_name: String,
    pub download_url: String,
    pub input_format: String,
    pub output_format: String,
}

impl ConversionResult {
    pub const MESSAGE: &'static str = "Conversion completed successfully";
}

#[derive(Debug)]
pub enum ConversionOutcome {
    Converted(ConversionResult),
    /// Input and output formats are the same; nothing was done
    AlreadyInFormat { format: String },
}

impl ConversionOutcome {
    pub fn no_op_message(format: &str) -> String {
        format!("File is already in {} format", format)
    }
}

/// Orchestrator boundary error
///
/// Validation failures keep their kind. Everything after validation collapses into
/// `Failed`, with the step that broke preserved in the message text.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Failed { message: String },
}

impl From<RemoteError> for ConversionError {
    fn from(err: RemoteError) -> Self {
        ConversionError::Failed {
            message: err.to_string(),
        }
    }
}

impl From<StorageError> for ConversionError {
    fn from(err: StorageError) -> Self {
        ConversionError::Failed {
            message: format!("An unexpected error occurred: {}", err),
        }
    }
}
