use async_trait::async_trait;
use futures::StreamExt;
use pixform_core::{normalize_format, Config, ConversionOptions, API_KEY_PLACEHOLDER};
use serde_json::{json, Value};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;

use crate::converter::RemoteConverter;
use crate::error::RemoteError;
use crate::models::{
    ApiErrorBody, Job, JobEnvelope, CONVERT_TASK, EXPORT_TASK, IMPORT_TASK, OP_CONVERT,
    OP_EXPORT_URL, OP_IMPORT_UPLOAD, STATUS_ERROR, STATUS_FINISHED,
};

const DEFAULT_API_URL: &str = "https://api.cloudconvert.com/v2";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 60; // 2 minutes with 2-second intervals
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 120;

/// Fixed-interval polling budget for one job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

impl PollSettings {
    /// Enough attempts at `interval` to cover `timeout`, at least one.
    pub fn from_timeout(interval: Duration, timeout: Duration) -> Self {
        let interval_ms = interval.as_millis().max(1);
        let attempts = timeout.as_millis().div_ceil(interval_ms).max(1);
        Self {
            interval,
            max_attempts: u32::try_from(attempts).unwrap_or(u32::MAX),
        }
    }
}

/// CloudConvert v2 job API client
///
/// Each [`RemoteConverter::convert`] call builds its own `reqwest::Client`, shared by the
/// create, upload, poll and download steps of that call and dropped when it returns.
#[derive(Clone)]
pub struct CloudConvertClient {
    api_key: String,
    api_url: String,
    poll: PollSettings,
    http_timeout: Duration,
}

impl Debug for CloudConvertClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CloudConvertClient")
            .field("api_url", &self.api_url)
            .field("poll", &self.poll)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

impl CloudConvertClient {
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            poll: PollSettings::default(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    pub fn with_default_url(api_key: impl Into<String>) -> Self {
        Self::new(api_key, DEFAULT_API_URL)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.cloudconvert_api_key(), config.cloudconvert_api_url())
            .with_poll(PollSettings::from_timeout(
                Duration::from_secs(config.poll_interval_secs()),
                Duration::from_secs(config.conversion_timeout_secs()),
            ))
            .with_http_timeout(Duration::from_secs(config.http_timeout_secs()))
    }

    pub fn with_poll(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != API_KEY_PLACEHOLDER
    }

    fn http_client(&self) -> Result<reqwest::Client, RemoteError> {
        Ok(reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()?)
    }

    /// Create a job with import, convert and export tasks
    async fn create_job(
        &self,
        http: &reqwest::Client,
        output_format: &str,
        options: &ConversionOptions,
    ) -> Result<Job, RemoteError> {
        let url = format!("{}/jobs", self.api_url);

        let response = http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&job_payload(output_format, options))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(RemoteError::JobCreationFailed(message));
        }

        let envelope: JobEnvelope = serde_json::from_str(&body)
            .map_err(|e| RemoteError::InvalidResponse(format!("job creation: {}", e)))?;

        tracing::info!(
            job_id = %envelope.data.id,
            output_format = %output_format,
            "CloudConvert job created"
        );

        Ok(envelope.data)
    }

    /// Post the input file to the import task's pre-signed form
    async fn upload_file(
        &self,
        http: &reqwest::Client,
        job: &Job,
        input: &Path,
    ) -> Result<(), RemoteError> {
        let form_spec = job
            .find_task(OP_IMPORT_UPLOAD)
            .and_then(|t| t.result.as_ref())
            .and_then(|r| r.form.as_ref())
            .ok_or_else(|| RemoteError::TaskNotFound(OP_IMPORT_UPLOAD.to_string()))?;

        let mut form = reqwest::multipart::Form::new();
        for (key, value) in &form_spec.parameters {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            form = form.text(key.clone(), value);
        }

        let file = tokio::fs::File::open(input).await?;
        let length = file.metadata().await?.len();
        let file_name = input
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let body = reqwest::Body::wrap_stream(tokio_util::io::ReaderStream::new(file));
        form = form.part(
            "file",
            reqwest::multipart::Part::stream_with_length(body, length).file_name(file_name),
        );

        let start = Instant::now();
        let response = http.post(&form_spec.url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RemoteError::UploadFailed(text));
        }

        tracing::debug!(
            job_id = %job.id,
            size_bytes = length,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Uploaded input file to CloudConvert"
        );

        Ok(())
    }

    async fn get_job(&self, http: &reqwest::Client, job_id: &str) -> Result<Job, RemoteError> {
        let url = format!("{}/jobs/{}", self.api_url, job_id);

        let response = http.get(&url).bearer_auth(&self.api_key).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RemoteError::StatusCheckFailed(body));
        }

        let envelope: JobEnvelope = serde_json::from_str(&body)
            .map_err(|e| RemoteError::InvalidResponse(format!("job status: {}", e)))?;
        Ok(envelope.data)
    }

    /// Poll until the job is `finished` or `error`, or the attempt budget runs out
    async fn wait_for_job(&self, http: &reqwest::Client, job_id: &str) -> Result<Job, RemoteError> {
        for attempt in 0..self.poll.max_attempts {
            let job = self.get_job(http, job_id).await?;

            match job.status.as_str() {
                STATUS_FINISHED => {
                    tracing::info!(
                        job_id = %job_id,
                        attempts = attempt + 1,
                        "CloudConvert job finished"
                    );
                    return Ok(job);
                }
                STATUS_ERROR => {
                    let message = job.error_message();
                    tracing::warn!(
                        job_id = %job_id,
                        error = %message,
                        "CloudConvert job failed"
                    );
                    return Err(RemoteError::RemoteConversionFailed(message));
                }
                other => {
                    tracing::debug!(
                        job_id = %job_id,
                        attempt = attempt + 1,
                        status = %other,
                        "Waiting for CloudConvert job to complete"
                    );
                    if attempt + 1 < self.poll.max_attempts {
                        sleep(self.poll.interval).await;
                    }
                }
            }
        }

        tracing::warn!(
            job_id = %job_id,
            attempts = self.poll.max_attempts,
            "CloudConvert job timed out"
        );
        Err(RemoteError::ConversionTimedOut)
    }

    /// Stream the export task's first file to `output`
    async fn download_file(
        &self,
        http: &reqwest::Client,
        job: &Job,
        output: &Path,
    ) -> Result<u64, RemoteError> {
        let export = job
            .find_task(OP_EXPORT_URL)
            .ok_or_else(|| RemoteError::TaskNotFound(OP_EXPORT_URL.to_string()))?;
        let file_url = export
            .result
            .as_ref()
            .and_then(|r| r.files.first())
            .map(|f| f.url.clone())
            .ok_or_else(|| {
                RemoteError::DownloadFailed("export task returned no files".to_string())
            })?;

        let response = http.get(&file_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RemoteError::DownloadFailed(text));
        }

        let mut file = tokio::fs::File::create(output).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.sync_all().await?;

        tracing::debug!(
            job_id = %job.id,
            path = %output.display(),
            size_bytes = written,
            "Downloaded converted file"
        );

        Ok(written)
    }
}

/// JSON body for `POST /jobs`
pub fn job_payload(output_format: &str, options: &ConversionOptions) -> Value {
    let mut convert = json!({
        "operation": OP_CONVERT,
        "input": IMPORT_TASK,
        "output_format": normalize_format(output_format),
    });
    if let (Value::Object(fields), Ok(Value::Object(extra))) =
        (&mut convert, serde_json::to_value(options))
    {
        fields.extend(extra);
    }

    json!({
        "tasks": {
            IMPORT_TASK: { "operation": OP_IMPORT_UPLOAD },
            CONVERT_TASK: convert,
            EXPORT_TASK: { "operation": OP_EXPORT_URL, "input": CONVERT_TASK },
        }
    })
}

#[async_trait]
impl RemoteConverter for CloudConvertClient {
    async fn convert(
        &self,
        input: &Path,
        output_format: &str,
        options: &ConversionOptions,
        output: &Path,
    ) -> Result<(), RemoteError> {
        if !self.is_configured() {
            return Err(RemoteError::NotConfigured);
        }

        let start = Instant::now();
        let http = self.http_client()?;

        let job = self.create_job(&http, output_format, options).await?;
        self.upload_file(&http, &job, input).await?;
        let finished = self.wait_for_job(&http, &job.id).await?;
        let size = self.download_file(&http, &finished, output).await?;

        tracing::info!(
            job_id = %job.id,
            output_format = %output_format,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote conversion completed"
        );

        Ok(())
    }
}
