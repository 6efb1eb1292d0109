//! Route prefixes and request limits

/// Prefix for the JSON API routes
pub const API_PREFIX: &str = "/api";

/// Route prefix under which converted files are served
pub const DOWNLOAD_PREFIX: &str = "/api/download";

/// Head-room on top of the upload limit for multipart boundaries and text fields
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Default number of requests served concurrently
pub const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// Message returned when a download name does not resolve to a stored file
pub const FILE_NOT_FOUND_MESSAGE: &str = "File not found. It may have been deleted or expired.";
