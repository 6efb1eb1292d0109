//! Test helpers: build AppState and router for integration tests.
//!
//! The remote converter is replaced by [`FakeConverter`], so no network access is needed.
//! Run from workspace root: `cargo test -p pixform-api`.

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use pixform_api::setup::routes;
use pixform_api::state::AppState;
use pixform_cloudconvert::{RemoteConverter, RemoteError};
use pixform_core::{Config, ConversionOptions, ConverterConfig};
use pixform_storage::TempFileStore;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Bytes the fake converter writes as the converted file
pub const CONVERTED_BYTES: &[u8] = b"converted image bytes";

/// What the fake remote service does with a job
#[derive(Debug, Clone)]
pub enum FakeBehavior {
    Succeed,
    /// Writes a partial output, then reports the job as failed with this message
    Fail(String),
    TimeOut,
}

pub struct FakeConverter {
    behavior: FakeBehavior,
    calls: AtomicUsize,
    last_options: Mutex<Option<ConversionOptions>>,
}

impl FakeConverter {
    pub fn new(behavior: FakeBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_options: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_options(&self) -> Option<ConversionOptions> {
        *self.last_options.lock().unwrap()
    }
}

#[async_trait]
impl RemoteConverter for FakeConverter {
    async fn convert(
        &self,
        _input: &Path,
        _output_format: &str,
        options: &ConversionOptions,
        output: &Path,
    ) -> Result<(), RemoteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_options.lock().unwrap() = Some(*options);

        match &self.behavior {
            FakeBehavior::Succeed => {
                tokio::fs::write(output, CONVERTED_BYTES).await?;
                Ok(())
            }
            FakeBehavior::Fail(message) => {
                tokio::fs::write(output, b"partial").await?;
                Err(RemoteError::RemoteConversionFailed(message.clone()))
            }
            FakeBehavior::TimeOut => Err(RemoteError::ConversionTimedOut),
        }
    }
}

/// Test application: server plus the resources it owns.
pub struct TestApp {
    pub server: TestServer,
    pub converter: Arc<FakeConverter>,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Names of the files currently in the temp root
    pub fn temp_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.temp_dir.path())
            .expect("read temp dir")
            .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Config for tests: 1 MB upload limit and a configured API key
pub fn create_test_config(temp_dir: &Path) -> ConverterConfig {
    ConverterConfig {
        cloudconvert_api_key: "test-key".to_string(),
        max_file_size_mb: 1,
        temp_dir: temp_dir.to_path_buf(),
        ..Default::default()
    }
}

pub async fn setup_test_app(behavior: FakeBehavior) -> TestApp {
    setup_test_app_with(behavior, |_| {}).await
}

/// Setup test app, letting the caller adjust the config first
pub async fn setup_test_app_with(
    behavior: FakeBehavior,
    customize: impl FnOnce(&mut ConverterConfig),
) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

    let mut inner = create_test_config(temp_dir.path());
    customize(&mut inner);
    let config = Config::new(inner);

    let store = Arc::new(
        TempFileStore::new(temp_dir.path())
            .await
            .expect("Failed to create temp store"),
    );
    let converter = Arc::new(FakeConverter::new(behavior));
    let state = Arc::new(AppState::new(config.clone(), store, converter.clone()));

    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        converter,
        temp_dir,
    }
}

/// Multipart form with a `file` part and an `output_format` field
pub fn convert_form(filename: &str, data: Vec<u8>, output_format: &str) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(data))
        .file_name(filename.to_string())
        .mime_type("application/octet-stream");
    MultipartForm::new()
        .add_part("file", part)
        .add_text("output_format", output_format.to_string())
}
