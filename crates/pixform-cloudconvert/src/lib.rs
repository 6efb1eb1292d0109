//! Pixform CloudConvert client
//!
//! Drives the CloudConvert v2 job protocol for a single file: create a job with
//! import, convert and export tasks, upload the input, poll until the job settles,
//! then download the export. [`RemoteConverter`] is the seam the API crate depends
//! on, so the network side can be replaced in tests.

pub mod client;
pub mod converter;
pub mod error;
pub mod models;

pub use client::{CloudConvertClient, PollSettings};
pub use converter::RemoteConverter;
pub use error::RemoteError;
