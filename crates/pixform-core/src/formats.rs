//! Supported image formats
//!
//! The allow-list is fixed for the lifetime of the process. Both the validator and
//! output filename generation read it; `jpg` and `jpeg` are the same format and the
//! remote conversion service only understands `jpeg`.

/// Extensions accepted for input files and requested output formats.
pub const SUPPORTED_FORMATS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Check whether an already lower-cased extension is in the allow-list
pub fn is_supported_format(format: &str) -> bool {
    SUPPORTED_FORMATS.contains(&format)
}

/// Map `jpg` to `jpeg`; every other format is returned unchanged.
pub fn normalize_format(format: &str) -> &str {
    if format == "jpg" {
        "jpeg"
    } else {
        format
    }
}

/// Whether two formats name the same encoding once `jpg`/`jpeg` are folded together.
pub fn same_format(a: &str, b: &str) -> bool {
    normalize_format(a) == normalize_format(b)
}

/// Owned copy of the allow-list, for JSON responses.
pub fn supported_formats() -> Vec<String> {
    SUPPORTED_FORMATS.iter().map(|f| f.to_string()).collect()
}
