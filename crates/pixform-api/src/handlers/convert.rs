use crate::error::HttpAppError;
use crate::services::conversion::{ConversionOutcome, ConversionResult};
use crate::state::AppState;
use crate::utils::upload::extract_convert_form;
use axum::extract::multipart::MultipartRejection;
use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ConvertedResponse {
    pub success: bool,
    pub message: String,
    pub original_filename: String,
    pub output_filename: String,
    pub download_url: String,
    pub input_format: String,
    pub output_format: String,
}

impl From<ConversionResult> for ConvertedResponse {
    fn from(result: ConversionResult) -> Self {
        Self {
            success: true,
            message: ConversionResult::MESSAGE.to_string(),
            original_filename: result.original_filename,
            output_filename: result.output_filename,
            download_url: result.download_url,
            input_format: result.input_format,
            output_format: result.output_format,
        }
    }
}

/// Body returned when no conversion was needed
#[derive(Debug, Serialize)]
pub struct SkippedResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ConvertResponse {
    Converted(ConvertedResponse),
    Skipped(SkippedResponse),
}

impl From<ConversionOutcome> for ConvertResponse {
    fn from(outcome: ConversionOutcome) -> Self {
        match outcome {
            ConversionOutcome::Converted(result) => ConvertResponse::Converted(result.into()),
            ConversionOutcome::AlreadyInFormat { format } => {
                ConvertResponse::Skipped(SkippedResponse {
                    success: false,
                    error: ConversionOutcome::no_op_message(&format),
                })
            }
        }
    }
}

#[tracing::instrument(skip(state, multipart))]
pub async fn convert_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ConvertResponse>, HttpAppError> {
    let form = extract_convert_form(multipart?, state.config.max_file_size_bytes()).await?;

    tracing::info!(
        filename = %form.upload.filename,
        size_bytes = form.upload.size(),
        output_format = %form.output_format,
        "Conversion requested"
    );

    let outcome = state
        .conversion
        .convert(&form.upload, &form.output_format, form.options)
        .await?;

    Ok(Json(outcome.into()))
}
