use crate::state::AppState;
use axum::{extract::State, Json};
use pixform_core::supported_formats;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub api_configured: bool,
    pub supported_formats: Vec<String>,
    pub max_file_size_mb: usize,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        api_configured: state.api_configured,
        supported_formats: supported_formats(),
        max_file_size_mb: state.config.max_file_size_mb(),
    })
}
