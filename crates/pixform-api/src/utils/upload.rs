//! Multipart parsing for the convert endpoint

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use bytes::BytesMut;
use pixform_core::AppError;
use pixform_processing::ValidationError;

use crate::error::HttpAppError;
use crate::services::conversion::{RequestedOptions, Upload};

/// Fields of a `POST /api/convert` request
#[derive(Debug)]
pub struct ConvertForm {
    pub upload: Upload,
    pub output_format: String,
    pub options: RequestedOptions,
}

/// Extract the file, `output_format` and the optional `quality`/`width`/`height` fields.
///
/// Only one field named "file" is accepted. Its body is read chunk by chunk and the read
/// stops as soon as it grows past `max_file_size`.
pub async fn extract_convert_form(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<ConvertForm, HttpAppError> {
    let mut upload: Option<Upload> = None;
    let mut output_format: Option<String> = None;
    let mut options = RequestedOptions::default();

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        match field_name.as_str() {
            "file" => {
                if upload.is_some() {
                    return Err(AppError::InvalidInput(
                        "Multiple file fields are not allowed; send exactly one field named 'file'"
                            .to_string(),
                    )
                    .into());
                }
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                let data = read_limited(field, max_file_size).await?;
                upload = Some(Upload::new(filename, data));
            }
            "output_format" => output_format = Some(field.text().await?),
            "quality" => options.quality = parse_int_field("quality", field).await?,
            "width" => options.width = parse_int_field("width", field).await?,
            "height" => options.height = parse_int_field("height", field).await?,
            _ => {}
        }
    }

    let upload =
        upload.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;
    let output_format = output_format
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("output_format is required".to_string()))?;

    Ok(ConvertForm {
        upload,
        output_format,
        options,
    })
}

async fn read_limited(mut field: Field<'_>, max_size: usize) -> Result<BytesMut, HttpAppError> {
    let mut data = BytesMut::new();

    while let Some(chunk) = field.chunk().await? {
        data.extend_from_slice(&chunk);
        if data.len() > max_size {
            return Err(ValidationError::PayloadTooLarge {
                size: data.len(),
                max: max_size,
            }
            .into());
        }
    }

    Ok(data)
}

// Blank values count as absent, the way HTML forms submit untouched inputs.
async fn parse_int_field(name: &str, field: Field<'_>) -> Result<Option<i64>, HttpAppError> {
    let raw = field.text().await?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    raw.parse::<i64>().map(Some).map_err(|_| {
        AppError::InvalidInput(format!("{} must be an integer, got '{}'", name, raw)).into()
    })
}
