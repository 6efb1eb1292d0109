//! Magic-number content sniffing.
//!
//! Returns `None` when the leading bytes match no known signature. Callers treat that
//! as "unknown" and fall back to extension-only validation.

/// Detect a MIME type from the first bytes of a file.
pub fn detect_mime(data: &[u8]) -> Option<&'static str> {
    if data.len() < 4 {
        return None;
    }

    // JPEG: FF D8 FF
    if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }

    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Some("image/png");
    }

    if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
        return Some("image/gif");
    }

    // RIFF container: WEBP or WAVE at offset 8
    if data.len() >= 12 && data.starts_with(b"RIFF") {
        return match &data[8..12] {
            b"WEBP" => Some("image/webp"),
            b"WAVE" => Some("audio/wav"),
            b"AVI " => Some("video/x-msvideo"),
            _ => None,
        };
    }

    if data.starts_with(b"BM") && data.len() >= 14 {
        return Some("image/bmp");
    }

    if data.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || data.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
    {
        return Some("image/tiff");
    }

    if data.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
        return Some("image/x-icon");
    }

    if data.starts_with(b"%PDF") {
        return Some("application/pdf");
    }

    if data.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
        return Some("application/zip");
    }

    if data.starts_with(&[0x1F, 0x8B]) {
        return Some("application/gzip");
    }

    if data.starts_with(&[0x7F, b'E', b'L', b'F']) {
        return Some("application/x-executable");
    }

    if data.starts_with(b"MZ") {
        return Some("application/x-msdownload");
    }

    if data.starts_with(b"ID3") {
        return Some("audio/mpeg");
    }

    if data.starts_with(b"OggS") {
        return Some("audio/ogg");
    }

    if looks_like_html(data) {
        return Some("text/html");
    }

    None
}

fn looks_like_html(data: &[u8]) -> bool {
    let head = &data[..data.len().min(64)];
    let start = head
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(head.len());
    let head = String::from_utf8_lossy(&head[start..]).to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}
