//! Pixform Infrastructure Library
//!
//! Shared runtime plumbing for the API binary:
//! - Tracing subscriber initialisation
//! - Request ID middleware
//! - Periodic temp directory cleanup

pub mod cleanup;
pub mod middleware;
pub mod telemetry;

// Re-export commonly used types
pub use cleanup::CleanupService;
pub use middleware::{request_id_middleware, request_span, RequestId, REQUEST_ID_HEADER};
pub use telemetry::init_telemetry;
