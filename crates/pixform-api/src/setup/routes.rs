//! Route configuration and setup

use crate::constants::{API_PREFIX, DEFAULT_HTTP_CONCURRENCY_LIMIT, MULTIPART_OVERHEAD_BYTES};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::{DefaultBodyLimit, Request},
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use pixform_core::Config;
use pixform_infra::{request_id_middleware, request_span};
use std::sync::Arc;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
        .max(1);

    let api_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/formats", get(handlers::formats::get_formats))
        .route("/convert", post(handlers::convert::convert_image))
        .route("/download/{filename}", get(handlers::download::download_file));

    let app = Router::new()
        .route("/ping", get(handlers::ping::ping))
        .nest(API_PREFIX, api_routes)
        // The multipart reader enforces the file limit itself
        .layer(DefaultBodyLimit::disable())
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(
            config.max_file_size_bytes() + MULTIPART_OVERHEAD_BYTES,
        ))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| request_span(request)),
        )
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| o.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!("Invalid CORS origin: {}", e))?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixform_core::ConverterConfig;

    #[test]
    fn test_setup_cors_accepts_explicit_origins() {
        let mut inner = ConverterConfig::default();
        inner.base.cors_origins = vec!["https://example.com".to_string()];
        assert!(setup_cors(&Config::new(inner)).is_ok());
    }

    #[test]
    fn test_setup_cors_rejects_malformed_origin() {
        let mut inner = ConverterConfig::default();
        inner.base.cors_origins = vec!["bad\norigin".to_string()];
        assert!(setup_cors(&Config::new(inner)).is_err());
    }
}
