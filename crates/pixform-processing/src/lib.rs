//! Pixform Processing Library
//!
//! Input validation for conversion requests: upload size, input and output format
//! against the supported format set, content sniffing, filename sanitization and the
//! optional quality/resize parameters. Nothing in this crate touches the filesystem
//! or the network.

pub mod sanitize;
pub mod sniff;
pub mod validator;

pub use sanitize::sanitize_filename;
pub use sniff::detect_mime;
pub use validator::{
    get_file_extension, validate_input_format, validate_options, validate_output_format,
    validate_quality, validate_resize_dimensions, ImageValidator, ValidationError,
    MAX_RESIZE_DIMENSION,
};
