use thiserror::Error;

/// Failures while driving a remote conversion job
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error(
        "CloudConvert API key not configured. Please set CLOUDCONVERT_API_KEY in your .env file."
    )]
    NotConfigured,

    #[error("Failed to create job: {0}")]
    JobCreationFailed(String),

    #[error("File upload failed: {0}")]
    UploadFailed(String),

    #[error("Failed to check job status: {0}")]
    StatusCheckFailed(String),

    #[error("Conversion failed: {0}")]
    RemoteConversionFailed(String),

    #[error("Conversion timed out")]
    ConversionTimedOut,

    #[error("Failed to download converted file: {0}")]
    DownloadFailed(String),

    #[error("Task with operation '{0}' not found")]
    TaskNotFound(String),

    #[error("Unexpected response from conversion service: {0}")]
    InvalidResponse(String),

    #[error("Network error during conversion: {0}")]
    Network(#[from] reqwest::Error),

    #[error("File error during conversion: {0}")]
    Io(#[from] std::io::Error),
}
