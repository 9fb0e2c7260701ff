use std::fmt;

use thiserror::Error;

/// Backend-assigned job identifier; opaque to the client.
pub type TaskId = String;

/// City used by the backend when a crawl request names none.
pub const DEFAULT_CITY: &str = "北京";
/// Months of reviews a crawl covers by default.
pub const DEFAULT_MONTHS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobKind {
    Crawl,
    Analyze,
    Wordcloud,
}

impl JobKind {
    pub const ALL: [JobKind; 3] = [JobKind::Crawl, JobKind::Analyze, JobKind::Wordcloud];

    pub fn as_str(self) -> &'static str {
        match self {
            JobKind::Crawl => "crawl",
            JobKind::Analyze => "analyze",
            JobKind::Wordcloud => "wordcloud",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Completed and failed jobs never change status again.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Kind-specific submission payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobParams {
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

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required for a {kind} job")]
    MissingField {
        kind: JobKind,
        field: &'static str,
    },
}

impl JobParams {
    pub fn crawl(restaurant_name: impl Into<String>, city: impl Into<String>, months: u32) -> Self {
        JobParams::Crawl {
            restaurant_name: restaurant_name.into(),
            city: city.into(),
            months,
        }
    }

    pub fn analyze(filename: impl Into<String>) -> Self {
        JobParams::Analyze {
            filename: filename.into(),
        }
    }

    pub fn wordcloud(analysis_filename: impl Into<String>) -> Self {
        JobParams::Wordcloud {
            analysis_filename: analysis_filename.into(),
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            JobParams::Crawl { .. } => JobKind::Crawl,
            JobParams::Analyze { .. } => JobKind::Analyze,
            JobParams::Wordcloud { .. } => JobKind::Wordcloud,
        }
    }

    /// Trims the required string field and rejects it when blank.
    pub fn validated(self) -> Result<Self, ValidationError> {
        let kind = self.kind();
        match self {
            JobParams::Crawl {
                restaurant_name,
                city,
                months,
            } => Ok(JobParams::Crawl {
                restaurant_name: required(kind, "restaurant_name", restaurant_name)?,
                city: city.trim().to_string(),
                months,
            }),
            JobParams::Analyze { filename } => Ok(JobParams::Analyze {
                filename: required(kind, "filename", filename)?,
            }),
            JobParams::Wordcloud { analysis_filename } => Ok(JobParams::Wordcloud {
                analysis_filename: required(kind, "analysis_filename", analysis_filename)?,
            }),
        }
    }
}

fn required(kind: JobKind, field: &'static str, value: String) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField { kind, field })
    } else {
        Ok(trimmed.to_string())
    }
}
