use axum::Json;
use pixform_core::supported_formats;
use serde::Serialize;

/// Every supported format works as both input and output
#[derive(Debug, Serialize)]
pub struct FormatsResponse {
    pub input_formats: Vec<String>,
    pub output_formats: Vec<String>,
}

pub async fn get_formats() -> Json<FormatsResponse> {
    Json(FormatsResponse {
        input_formats: supported_formats(),
        output_formats: supported_formats(),
    })
}
