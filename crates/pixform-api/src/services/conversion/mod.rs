//! Request orchestration for a single conversion
//!
//! Validates the upload, skips same-format requests, hands the file to the remote
//! converter and leaves the converted artifact in the temp store for download.

mod service;
mod types;

pub use service::ConversionService;
pub use types::{ConversionError, ConversionOutcome, ConversionResult, RequestedOptions, Upload};
