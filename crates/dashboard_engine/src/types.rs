use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type TaskId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobKind {
    Crawl,
    Analyze,
    Wordcloud,
}

impl JobKind {
    /// Submission endpoint segment under `/api/`.
    pub fn endpoint(self) -> &'static str {
        match self {
            JobKind::Crawl => "crawl",
            JobKind::Analyze => "analyze",
            JobKind::Wordcloud => "wordcloud",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}

/// Request body for one of the submission endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SubmitRequest {
    Crawl {
        restaurant_name: String,
        city: String,
        months: u32,
    },
    Analyze {
        filename: String,
    },
    Wordcloud {
        analysis_filename: String,
    },
}

impl SubmitRequest {
    pub fn kind(&self) -> JobKind {
        match self {
            SubmitRequest::Crawl { .. } => JobKind::Crawl,
            SubmitRequest::Analyze { .. } => JobKind::Analyze,
            SubmitRequest::Wordcloud { .. } => JobKind::Wordcloud,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteStatus {
    #[serde(alias = "queued")]
    Pending,
    Running,
    Completed,
    Failed,
    /// The backend does not know the task id.
    NotFound,
}

impl RemoteStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RemoteStatus::Completed | RemoteStatus::Failed | RemoteStatus::NotFound
        )
    }
}

/// Body of `/api/task_status/{id}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskStatus {
    pub status: RemoteStatus,
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct DataFiles {
    pub comment_files: Vec<String>,
    pub analysis_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Submitted {
        kind: JobKind,
        task_id: TaskId,
    },
    SubmitFailed {
        kind: JobKind,
        error: ApiError,
    },
    Status {
        kind: JobKind,
        task_id: TaskId,
        status: TaskStatus,
    },
    PollFailed {
        kind: JobKind,
        task_id: TaskId,
        error: ApiError,
    },
    PollTimedOut {
        kind: JobKind,
        task_id: TaskId,
    },
    FilesListed(Result<DataFiles, ApiError>),
    AnalysisLoaded {
        filename: String,
        result: Result<Value, ApiError>,
    },
    Downloaded {
        filename: String,
        result: Result<PathBuf, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Network,
    Timeout,
    HttpStatus(u16),
    /// The body was not the JSON shape the endpoint promises.
    Decode,
    /// The backend answered `success: false`.
    Rejected,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Decode => write!(f, "unexpected response"),
            FailureKind::Rejected => write!(f, "rejected by backend"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Io => write!(f, "io error"),
        }
    }
}
