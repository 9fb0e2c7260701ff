use std::collections::{BTreeMap, BTreeSet};

use crate::view_model::{AppViewModel, FileListingView, ProgressRow};
use crate::{AnalysisResults, FileListing, JobKind, JobStatus, TaskId};

/// The job currently registered for a kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveJob {
    pub task_id: TaskId,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
    pub poll_failures: u32,
}

impl ActiveJob {
    fn new(task_id: TaskId) -> Self {
        Self {
            task_id,
            status: JobStatus::Pending,
            progress: 0,
            message: String::new(),
            poll_failures: 0,
        }
    }
}

/// Session state for one dashboard client.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    jobs: BTreeMap<JobKind, ActiveJob>,
    submitting: BTreeSet<JobKind>,
    files: Option<FileListing>,
    latest_analysis: Option<AnalysisResults>,
    outstanding_requests: usize,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let mut progress = Vec::new();
        for kind in JobKind::ALL {
            if self.submitting.contains(&kind) {
                progress.push(ProgressRow {
                    kind,
                    percent: 0,
                    message: "submitting job".to_string(),
                    poll_failures: 0,
                });
            } else if let Some(job) = self.jobs.get(&kind).filter(|job| !job.status.is_terminal()) {
                progress.push(ProgressRow {
                    kind,
                    percent: job.progress,
                    message: job.message.clone(),
                    poll_failures: job.poll_failures,
                });
            }
        }

        AppViewModel {
            progress,
            files: self.files.as_ref().map(FileListingView::from_listing),
            idle: self.is_idle(),
            dirty: self.dirty,
        }
    }

    pub fn job(&self, kind: JobKind) -> Option<&ActiveJob> {
        self.jobs.get(&kind)
    }

    pub fn files(&self) -> Option<&FileListing> {
        self.files.as_ref()
    }

    pub fn latest_analysis(&self) -> Option<&AnalysisResults> {
        self.latest_analysis.as_ref()
    }

    /// A kind is busy while its submission is in flight or its job is not terminal.
    pub fn is_busy(&self, kind: JobKind) -> bool {
        self.submitting.contains(&kind)
            || self
                .jobs
                .get(&kind)
                .is_some_and(|job| !job.status.is_terminal())
    }

    /// Nothing left to wait for.
    pub fn is_idle(&self) -> bool {
        self.outstanding_requests == 0 && JobKind::ALL.iter().all(|kind| !self.is_busy(*kind))
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn begin_submission(&mut self, kind: JobKind) {
        self.submitting.insert(kind);
        self.mark_dirty();
    }

    /// Returns false when no submission of `kind` was in flight.
    pub(crate) fn finish_submission(&mut self, kind: JobKind) -> bool {
        let was_submitting = self.submitting.remove(&kind);
        if was_submitting {
            self.mark_dirty();
        }
        was_submitting
    }

    pub(crate) fn register_job(&mut self, kind: JobKind, task_id: TaskId) {
        self.jobs.insert(kind, ActiveJob::new(task_id));
        self.mark_dirty();
    }

    /// The registered job for `kind` if it is `task_id` and still live.
    pub(crate) fn live_job_mut(&mut self, kind: JobKind, task_id: &str) -> Option<&mut ActiveJob> {
        self.jobs
            .get_mut(&kind)
            .filter(|job| job.task_id == task_id && !job.status.is_terminal())
    }

    pub(crate) fn set_files(&mut self, listing: FileListing) {
        self.files = Some(listing);
        self.mark_dirty();
    }

    pub(crate) fn set_latest_analysis(&mut self, analysis: AnalysisResults) {
        self.latest_analysis = Some(analysis);
        self.mark_dirty();
    }

    pub(crate) fn begin_request(&mut self) {
        self.outstanding_requests += 1;
    }

    pub(crate) fn end_request(&mut self) {
        self.outstanding_requests = self.outstanding_requests.saturating_sub(1);
    }
}
