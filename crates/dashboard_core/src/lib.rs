//! Dashboard core: pure job orchestration state machine and view-model helpers.
mod effect;
mod job;
mod msg;
mod payload;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, Notice, NoticeLevel};
pub use job::{JobKind, JobParams, JobStatus, TaskId, ValidationError, DEFAULT_CITY, DEFAULT_MONTHS};
pub use msg::{Msg, StatusUpdate};
pub use payload::{
    AnalysisResults, AnalyzeResult, BasicStats, CrawlResult, FileListing, Keyword, Labels,
    SentimentDistribution, Sentiments, WordcloudImage, WordcloudResult,
};
pub use state::{ActiveJob, AppState};
pub use update::update;
pub use view_model::{
    AnalysisView, AppViewModel, CategoryBar, FileListingView, FileSection, KeywordWeight,
    ProgressRow, SentimentSlice,
};
