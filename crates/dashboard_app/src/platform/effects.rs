use std::path::Path;

use dashboard_core::{Effect, FileListing, JobKind, JobParams, JobStatus, Msg, StatusUpdate};
use dashboard_engine::{EngineEvent, EngineHandle, RemoteStatus, SubmitRequest};
use engine_logging::{engine_debug, engine_info, engine_warn};

/// Effects the engine carries out; the rest belong to the presenter.
pub(crate) enum Routed {
    Engine,
    Present(Effect),
}

pub(crate) fn run_engine_effect(engine: &EngineHandle, effect: Effect, output_dir: &Path) -> Routed {
    match effect {
        Effect::Submit(params) => {
            let request = map_params(params);
            engine_info!("Submitting {} job", request.kind());
            engine.submit(request);
        }
        Effect::StartPolling { kind, task_id } => {
            engine.start_polling(map_kind(kind), task_id);
        }
        Effect::StopPolling { kind, task_id } => {
            engine_debug!("Stop polling {} task {}", kind, task_id);
            engine.stop_polling(map_kind(kind), task_id);
        }
        Effect::RefreshFiles => engine.list_files(),
        Effect::LoadAnalysis { filename } => engine.load_analysis(filename),
        Effect::Download { filename } => engine.download(filename, output_dir),
        other => return Routed::Present(other),
    }
    Routed::Engine
}

pub(crate) fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Submitted { kind, task_id } => Msg::SubmitAccepted {
            kind: map_engine_kind(kind),
            task_id,
        },
        EngineEvent::SubmitFailed { kind, error } => Msg::SubmitFailed {
            kind: map_engine_kind(kind),
            error: error.message,
        },
        EngineEvent::Status {
            kind,
            task_id,
            status,
        } => Msg::StatusReceived {
            kind: map_engine_kind(kind),
            task_id,
            update: StatusUpdate {
                status: map_status(status.status),
                progress: status.progress,
                message: status.message,
                result: status.result,
                error: status.error,
            },
        },
        EngineEvent::PollFailed {
            kind,
            task_id,
            error,
        } => Msg::PollFailed {
            kind: map_engine_kind(kind),
            task_id,
            error: error.to_string(),
        },
        EngineEvent::PollTimedOut { kind, task_id } => Msg::PollTimedOut {
            kind: map_engine_kind(kind),
            task_id,
        },
        EngineEvent::FilesListed(Ok(files)) => Msg::FilesListed(FileListing {
            comment_files: files.comment_files,
            analysis_files: files.analysis_files,
        }),
        EngineEvent::FilesListed(Err(error)) => {
            engine_warn!("Could not refresh the file listing: {}", error);
            Msg::FilesListFailed(error.to_string())
        }
        EngineEvent::AnalysisLoaded {
            filename,
            result: Ok(data),
        } => Msg::AnalysisLoaded { filename, data },
        EngineEvent::AnalysisLoaded {
            filename,
            result: Err(error),
        } => Msg::AnalysisLoadFailed {
            filename,
            error: error.message,
        },
        EngineEvent::Downloaded {
            filename,
            result: Ok(path),
        } => Msg::Downloaded { filename, path },
        EngineEvent::Downloaded {
            filename,
            result: Err(error),
        } => Msg::DownloadFailed {
            filename,
            error: error.to_string(),
        },
    }
}

fn map_params(params: JobParams) -> SubmitRequest {
    match params {
        JobParams::Crawl {
            restaurant_name,
            city,
            months,
        } => SubmitRequest::Crawl {
            restaurant_name,
            city,
            months,
        },
        JobParams::Analyze { filename } => SubmitRequest::Analyze { filename },
        JobParams::Wordcloud { analysis_filename } => SubmitRequest::Wordcloud { analysis_filename },
    }
}

fn map_kind(kind: JobKind) -> dashboard_engine::JobKind {
    match kind {
        JobKind::Crawl => dashboard_engine::JobKind::Crawl,
        JobKind::Analyze => dashboard_engine::JobKind::Analyze,
        JobKind::Wordcloud => dashboard_engine::JobKind::Wordcloud,
    }
}

fn map_engine_kind(kind: dashboard_engine::JobKind) -> JobKind {
    match kind {
        dashboard_engine::JobKind::Crawl => JobKind::Crawl,
        dashboard_engine::JobKind::Analyze => JobKind::Analyze,
        dashboard_engine::JobKind::Wordcloud => JobKind::Wordcloud,
    }
}

/// `not_found` ends the job like a failure; the backend sends its own error text.
fn map_status(status: RemoteStatus) -> JobStatus {
    match status {
        RemoteStatus::Pending => JobStatus::Pending,
        RemoteStatus::Running => JobStatus::Running,
        RemoteStatus::Completed => JobStatus::Completed,
        RemoteStatus::Failed | RemoteStatus::NotFound => JobStatus::Failed,
    }
}
