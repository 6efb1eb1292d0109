/// Longest stem (name without extension) kept by [`sanitize_filename`], in characters.
pub const MAX_STEM_CHARS: usize = 100;

const DANGEROUS: &[&str] = &["/", "\\", "..", "<", ">", ":", "\"", "|", "?", "*"];

/// Reduce a client-supplied filename to a single safe path component.
///
/// Directory components are dropped, control characters and every dangerous sequence
/// become `_`, and the stem is cut to [`MAX_STEM_CHARS`]. Applying it twice gives the same result as once.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let mut cleaned: String = base
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect();
    for pattern in DANGEROUS {
        cleaned = cleaned.replace(pattern, "_");
    }

    let (stem, ext) = split_extension(&cleaned);
    if stem.chars().count() > MAX_STEM_CHARS {
        let truncated: String = stem.chars().take(MAX_STEM_CHARS).collect();
        return format!("{}{}", truncated, ext);
    }

    cleaned
}

// A leading dot starts a hidden name, not an extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}
