//! Pixform Core Library
//!
//! This crate provides the supported format set, error types and configuration
//! that are shared across all Pixform components.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ConverterConfig, API_KEY_PLACEHOLDER};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use formats::{
    is_supported_format, normalize_format, same_format, supported_formats, SUPPORTED_FORMATS,
};
pub use models::ConversionOptions;
