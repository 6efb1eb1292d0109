//! Pixform API Library
//!
//! HTTP surface of the image conversion service: request handlers, the conversion
//! orchestrator and application setup.

pub mod constants;
pub mod error;
mod handlers;
pub mod services;
pub mod setup;
pub mod state;
mod utils;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
