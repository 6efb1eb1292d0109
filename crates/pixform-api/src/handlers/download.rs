use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};
use bytes::Bytes;
use futures::{stream, StreamExt};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use pixform_core::AppError;
use pixform_storage::display_name;
use std::sync::Arc;

/// Stream a converted file back to the client as an attachment.
///
/// The name must be a single path component inside the temp root; anything else is
/// reported as not found.
#[tracing::instrument(skip(state))]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, HttpAppError> {
    let (file_stream, size) = state.store.open_stream(&filename).await?;

    let body_stream = file_stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Temp file stream error: {}", e)))
    });

    let body = if state.config.delete_after_download() {
        let store = state.store.clone();
        let path = store.resolve(&filename)?;
        // Runs once the last chunk has been handed to the client
        let cleanup = stream::once(async move {
            store.delete(&path).await;
        })
        .filter_map(|()| async { None::<Result<Bytes, std::io::Error>> });
        Body::from_stream(body_stream.chain(cleanup))
    } else {
        Body::from_stream(body_stream)
    };

    tracing::info!(filename = %filename, size_bytes = size, "Serving converted file");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/octet-stream")
        .header(header::CONTENT_LENGTH, size)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(display_name(&filename)),
        )
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)).into())
}

// ASCII fallback plus RFC 5987 `filename*` for names outside printable ASCII.
fn content_disposition(name: &str) -> String {
    let printable = |c: char| c.is_ascii() && !c.is_ascii_control();
    if name.chars().all(printable) {
        return format!("attachment; filename=\"{}\"", name);
    }

    let fallback: String = name
        .chars()
        .map(|c| if printable(c) { c } else { '_' })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        utf8_percent_encode(name, NON_ALPHANUMERIC)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            content_disposition("cat_converted.png"),
            "attachment; filename=\"cat_converted.png\""
        );
    }

    #[test]
    fn test_content_disposition_non_ascii() {
        let value = content_disposition("chat_é_converted.png");
        assert!(value.starts_with("attachment; filename=\"chat___converted.png\""));
        assert!(value.contains("filename*=UTF-8''chat%5F%C3%A9%5Fconverted%2Epng"));
    }

    #[test]
    fn test_content_disposition_control_characters_make_valid_header() {
        let value = content_disposition("cat\u{1}\t_converted.png");
        assert!(value.starts_with("attachment; filename=\"cat___converted.png\""));
        assert!(value.contains("filename*=UTF-8''cat%01%09%5Fconverted%2Epng"));
        assert!(header::HeaderValue::from_str(&value).is_ok());
    }
}
