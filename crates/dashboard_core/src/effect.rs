use crate::{AnalysisResults, JobKind, JobParams, TaskId, WordcloudResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send the job request to the backend.
    Submit(JobParams),
    StartPolling { kind: JobKind, task_id: TaskId },
    StopPolling { kind: JobKind, task_id: TaskId },
    /// Re-read the available data files.
    RefreshFiles,
    LoadAnalysis { filename: String },
    Download { filename: String },
    PresentAnalysis(Box<AnalysisResults>),
    PresentWordclouds(WordcloudResult),
    /// The stored file listing changed and should be shown.
    PresentFiles,
    Notify(Notice),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A user-facing message, surfaced as soon as it is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub kind: Option<JobKind>,
    pub text: String,
}

impl Notice {
    pub fn info(kind: Option<JobKind>, text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            kind,
            text: text.into(),
        }
    }

    pub fn warning(kind: Option<JobKind>, text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            kind,
            text: text.into(),
        }
    }

    pub fn error(kind: Option<JobKind>, text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            kind,
            text: text.into(),
        }
    }
}
