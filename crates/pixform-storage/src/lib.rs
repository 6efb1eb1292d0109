//! Pixform Storage Library
//!
//! On-disk lifecycle of uploaded and converted files inside a single temp root.
//!
//! # Naming
//!
//! - Uploads: `{uuid}.{ext}`; the client filename is never used on disk.
//! - Outputs: `{uuid}_{stem}_converted.{format}`; everything after the first `_`
//!   is the name offered to the client on download.
//!
//! Names handed to [`TempFileStore::resolve`] must be a single path component.

pub mod error;
pub mod temp;

pub use error::{StorageError, StorageResult};
pub use temp::{display_name, generate_output_name, ByteStream, TempFileGuard, TempFileStore};
