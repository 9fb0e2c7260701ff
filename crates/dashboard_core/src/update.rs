use serde_json::Value;

use crate::{
    AnalysisResults, AnalyzeResult, AppState, CrawlResult, Effect, JobKind, JobParams, JobStatus,
    Msg, Notice, StatusUpdate, TaskId, WordcloudResult,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubmitRequested(params) => submit(&mut state, params),
        Msg::SubmitAccepted { kind, task_id } => {
            // An acceptance nobody is waiting for would start a second poll loop.
            if state.finish_submission(kind) {
                state.register_job(kind, task_id.clone());
                vec![Effect::StartPolling { kind, task_id }]
            } else {
                Vec::new()
            }
        }
        Msg::SubmitFailed { kind, error } => {
            state.finish_submission(kind);
            vec![Effect::Notify(Notice::error(
                Some(kind),
                format!("submission failed: {error}"),
            ))]
        }
        Msg::StatusReceived {
            kind,
            task_id,
            update,
        } => apply_status(&mut state, kind, task_id, update),
        Msg::PollFailed { kind, task_id, .. } => {
            if let Some(job) = state.live_job_mut(kind, &task_id) {
                job.poll_failures += 1;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::PollTimedOut { kind, task_id } => {
            let Some(job) = state.live_job_mut(kind, &task_id) else {
                return (state, Vec::new());
            };
            job.status = JobStatus::Failed;
            state.mark_dirty();
            vec![
                Effect::StopPolling { kind, task_id },
                Effect::Notify(Notice::error(
                    Some(kind),
                    "job failed: gave up waiting for the backend",
                )),
            ]
        }
        Msg::RefreshFilesRequested => refresh_files(&mut state),
        Msg::FilesListed(listing) => {
            state.end_request();
            state.set_files(listing);
            vec![Effect::PresentFiles]
        }
        Msg::FilesListFailed(_) => {
            state.end_request();
            Vec::new()
        }
        Msg::AnalysisRequested { filename } => {
            let filename = filename.trim().to_string();
            if filename.is_empty() {
                return (
                    state,
                    vec![Effect::Notify(Notice::error(None, "an analysis filename is required"))],
                );
            }
            state.begin_request();
            vec![Effect::LoadAnalysis { filename }]
        }
        Msg::AnalysisLoaded { filename, data } => {
            state.end_request();
            match serde_json::from_value::<AnalysisResults>(data) {
                Ok(analysis) => present_analysis(&mut state, analysis),
                Err(err) => vec![Effect::Notify(Notice::warning(
                    None,
                    format!("{filename} is not a readable analysis: {err}"),
                ))],
            }
        }
        Msg::AnalysisLoadFailed { filename, error } => {
            state.end_request();
            vec![Effect::Notify(Notice::error(
                None,
                format!("failed to load {filename}: {error}"),
            ))]
        }
        Msg::DownloadRequested { filename } => {
            let filename = filename.trim().to_string();
            if filename.is_empty() {
                return (
                    state,
                    vec![Effect::Notify(Notice::error(None, "a filename is required"))],
                );
            }
            state.begin_request();
            vec![Effect::Download { filename }]
        }
        Msg::Downloaded { filename, path } => {
            state.end_request();
            vec![Effect::Notify(Notice::info(
                None,
                format!("downloaded {filename} to {}", path.display()),
            ))]
        }
        Msg::DownloadFailed { filename, error } => {
            state.end_request();
            vec![Effect::Notify(Notice::error(
                None,
                format!("failed to download {filename}: {error}"),
            ))]
        }
    };

    (state, effects)
}

fn submit(state: &mut AppState, params: JobParams) -> Vec<Effect> {
    let kind = params.kind();
    let params = match params.validated() {
        Ok(params) => params,
        Err(err) => return vec![Effect::Notify(Notice::error(Some(kind), err.to_string()))],
    };
    if state.is_busy(kind) {
        return vec![Effect::Notify(Notice::warning(
            Some(kind),
            format!("a {kind} job is already in progress"),
        ))];
    }

    state.begin_submission(kind);
    vec![Effect::Submit(params)]
}

fn apply_status(
    state: &mut AppState,
    kind: JobKind,
    task_id: TaskId,
    update: StatusUpdate,
) -> Vec<Effect> {
    // Late or duplicate reports for a finished or replaced job are dropped.
    let Some(job) = state.live_job_mut(kind, &task_id) else {
        return Vec::new();
    };

    job.status = update.status;
    job.message = update.message.unwrap_or_default();
    if let Some(progress) = update.progress {
        job.progress = clamp_progress(progress);
    }

    let effects = match update.status {
        JobStatus::Pending | JobStatus::Running => Vec::new(),
        JobStatus::Completed => {
            job.progress = 100;
            let mut effects = vec![Effect::StopPolling { kind, task_id }];
            effects.extend(dispatch_result(state, kind, update.result));
            effects
        }
        JobStatus::Failed => {
            let error = update
                .error
                .filter(|error| !error.trim().is_empty())
                .unwrap_or_else(|| "unknown error".to_string());
            vec![
                Effect::StopPolling { kind, task_id },
                Effect::Notify(Notice::error(Some(kind), format!("job failed: {error}"))),
            ]
        }
    };
    state.mark_dirty();
    effects
}

fn dispatch_result(state: &mut AppState, kind: JobKind, result: Option<Value>) -> Vec<Effect> {
    let Some(result) = result else {
        let mut effects = vec![Effect::Notify(Notice::warning(
            Some(kind),
            "job completed without a result",
        ))];
        if kind != JobKind::Wordcloud {
            effects.extend(refresh_files(state));
        }
        return effects;
    };

    match kind {
        JobKind::Crawl => {
            let mut effects = match serde_json::from_value::<CrawlResult>(result) {
                Ok(crawl) => vec![Effect::Notify(Notice::info(
                    Some(kind),
                    format!("crawl finished: {} comments collected", crawl.comment_count),
                ))],
                Err(err) => vec![malformed(kind, &err)],
            };
            effects.extend(refresh_files(state));
            effects
        }
        JobKind::Analyze => match serde_json::from_value::<AnalyzeResult>(result) {
            Ok(analyze) => {
                let mut effects = vec![Effect::Notify(Notice::info(Some(kind), "analysis finished"))];
                effects.extend(refresh_files(state));
                effects.extend(present_analysis(state, analyze.analysis_results));
                effects
            }
            Err(err) => {
                let mut effects = vec![malformed(kind, &err)];
                effects.extend(refresh_files(state));
                effects
            }
        },
        JobKind::Wordcloud => match serde_json::from_value::<WordcloudResult>(result) {
            // No keywords on the backend side means no images at all.
            Ok(wordclouds) if wordclouds.is_empty() => vec![Effect::Notify(Notice::warning(
                Some(kind),
                "no word clouds in result",
            ))],
            Ok(wordclouds) => vec![
                Effect::Notify(Notice::info(Some(kind), "word clouds generated")),
                Effect::PresentWordclouds(wordclouds),
            ],
            Err(err) => vec![malformed(kind, &err)],
        },
    }
}

fn refresh_files(state: &mut AppState) -> Vec<Effect> {
    state.begin_request();
    vec![Effect::RefreshFiles]
}

fn present_analysis(state: &mut AppState, analysis: AnalysisResults) -> Vec<Effect> {
    state.set_latest_analysis(analysis.clone());
    vec![Effect::PresentAnalysis(Box::new(analysis))]
}

fn malformed(kind: JobKind, err: &serde_json::Error) -> Effect {
    Effect::Notify(Notice::warning(
        Some(kind),
        format!("job completed with an unreadable result: {err}"),
    ))
}

fn clamp_progress(progress: f64) -> u8 {
    if progress.is_nan() {
        return 0;
    }
    progress.round().clamp(0.0, 100.0) as u8
}
