use std::path::PathBuf;

use serde_json::Value;

use crate::{FileListing, JobKind, JobParams, JobStatus, TaskId};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User asked for a new job.
    SubmitRequested(JobParams),
    /// Backend accepted a submission and assigned an id.
    SubmitAccepted { kind: JobKind, task_id: TaskId },
    /// Backend rejected a submission, or the request never completed.
    SubmitFailed { kind: JobKind, error: String },
    /// A poll returned the job's current status.
    StatusReceived {
        kind: JobKind,
        task_id: TaskId,
        update: StatusUpdate,
    },
    /// A poll request failed in transport; polling carries on.
    PollFailed {
        kind: JobKind,
        task_id: TaskId,
        error: String,
    },
    /// The poll deadline passed without a terminal status.
    PollTimedOut { kind: JobKind, task_id: TaskId },
    RefreshFilesRequested,
    FilesListed(FileListing),
    FilesListFailed(String),
    /// User asked to view a stored analysis file.
    AnalysisRequested { filename: String },
    AnalysisLoaded { filename: String, data: Value },
    AnalysisLoadFailed { filename: String, error: String },
    DownloadRequested { filename: String },
    Downloaded { filename: String, path: PathBuf },
    DownloadFailed { filename: String, error: String },
}

/// One status report for a job.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatusUpdate {
    pub status: JobStatus,
    pub progress: Option<f64>,
    pub message: Option<String>,
    pub result: Option<Value>,
    pub error: Option<String>,
}
