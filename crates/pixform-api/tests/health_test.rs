//! Health, formats and ping endpoint tests.

mod helpers;

use helpers::{setup_test_app, setup_test_app_with, FakeBehavior};
use serde_json::{json, Value};

#[tokio::test]
async fn test_health_reports_configuration() {
    let app = setup_test_app(FakeBehavior::Succeed).await;

    let response = app.client().get("/api/health").await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(
        response.json::<Value>(),
        json!({
            "status": "healthy",
            "api_configured": true,
            "supported_formats": ["jpg", "jpeg", "png", "webp", "gif"],
            "max_file_size_mb": 1
        })
    );
}

#[tokio::test]
async fn test_health_without_api_key() {
    for key in ["", "your_api_key_here"] {
        let app = setup_test_app_with(FakeBehavior::Succeed, |config| {
            config.cloudconvert_api_key = key.to_string();
        })
        .await;

        let body = app.client().get("/api/health").await.json::<Value>();
        assert_eq!(body["api_configured"], false);
        assert_eq!(body["status"], "healthy");
    }
}

#[tokio::test]
async fn test_formats_lists_inputs_and_outputs() {
    let app = setup_test_app(FakeBehavior::Succeed).await;

    let response = app.client().get("/api/formats").await;

    assert_eq!(response.status_code(), 200);
    let expected = json!(["jpg", "jpeg", "png", "webp", "gif"]);
    let body = response.json::<Value>();
    assert_eq!(body["input_formats"], expected);
    assert_eq!(body["output_formats"], expected);
}

#[tokio::test]
async fn test_ping() {
    let app = setup_test_app(FakeBehavior::Succeed).await;

    let response = app.client().get("/ping").await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), json!({ "message": "pong" }));
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = setup_test_app(FakeBehavior::Succeed).await;

    let response = app
        .client()
        .get("/api/health")
        .add_header("X-Request-ID", "req-42")
        .await;

    assert_eq!(response.header("x-request-id"), "req-42");
}
