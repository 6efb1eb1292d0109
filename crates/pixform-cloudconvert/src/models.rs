//! Wire types for the CloudConvert v2 job API.
//!
//! Only the fields the client reads are modelled; unknown fields are ignored.

use serde::Deserialize;
use serde_json::{Map, Value};

/// Task names used in every job this client submits
pub const IMPORT_TASK: &str = "import-my-file";
pub const CONVERT_TASK: &str = "convert-my-file";
pub const EXPORT_TASK: &str = "export-my-file";

/// Task operations, matched when looking tasks up in a job response
pub const OP_IMPORT_UPLOAD: &str = "import/upload";
pub const OP_CONVERT: &str = "convert";
pub const OP_EXPORT_URL: &str = "export/url";

pub const STATUS_FINISHED: &str = "finished";
pub const STATUS_ERROR: &str = "error";

/// `{"data": ...}` wrapper around every job response
#[derive(Debug, Deserialize)]
pub struct JobEnvelope {
    pub data: Job,
}

#[derive(Debug, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Job {
    /// First task whose operation matches `operation`
    pub fn find_task(&self, operation: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.operation == operation)
    }

    /// Message of the job, or of its first failed task when the job carries none
    pub fn error_message(&self) -> String {
        self.message
            .clone()
            .or_else(|| {
                self.tasks
                    .iter()
                    .find(|t| t.status == STATUS_ERROR)
                    .and_then(|t| t.message.clone())
            })
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub name: Option<String>,
    pub operation: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<TaskResult>,
}

#[derive(Debug, Deserialize)]
pub struct TaskResult {
    #[serde(default)]
    pub form: Option<UploadForm>,
    #[serde(default)]
    pub files: Vec<ResultFile>,
}

/// Pre-signed form the import task expects the file to be posted to
#[derive(Debug, Deserialize)]
pub struct UploadForm {
    pub url: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ResultFile {
    #[serde(default)]
    pub filename: Option<String>,
    pub url: String,
}

/// Error body returned by the API on non-success responses
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
