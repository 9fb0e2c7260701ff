use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};

pub use std::sync::mpsc::RecvTimeoutError;

use crate::poller::{ChannelEventSink, EventSink, PollHandle, PollSettings};
use crate::{
    ApiClient, ApiError, AtomicFileWriter, ClientSettings, EngineEvent, JobKind, ReqwestApiClient,
    SubmitRequest, TaskId,
};

#[derive(Debug, Clone, Default)]
pub struct EngineSettings {
    pub client: ClientSettings,
    pub poll: PollSettings,
}

enum EngineCommand {
    Submit(SubmitRequest),
    StartPolling { kind: JobKind, task_id: TaskId },
    StopPolling { kind: JobKind, task_id: TaskId },
    ListFiles,
    LoadAnalysis { filename: String },
    Download { filename: String, dest_dir: PathBuf },
    Shutdown,
}

/// Owns the background IO thread. Commands go in, [`EngineEvent`]s come out.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings) -> Result<Self, ApiError> {
        let client = ReqwestApiClient::new(settings.client)?;
        engine_info!("Engine talking to {}", client.base_url());
        Ok(Self::with_client(Arc::new(client), settings.poll))
    }

    pub fn with_client(client: Arc<dyn ApiClient>, poll: PollSettings) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let sink: Arc<dyn EventSink> = Arc::new(ChannelEventSink::new(event_tx));

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let _guard = runtime.enter();
            // At most one poll loop per kind.
            let mut pollers: HashMap<JobKind, PollHandle> = HashMap::new();

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::StartPolling { kind, task_id } => {
                        engine_info!("Polling {} task {} every {:?}", kind, task_id, poll.interval);
                        let handle = PollHandle::spawn(
                            client.clone(),
                            kind,
                            task_id,
                            poll.clone(),
                            sink.clone(),
                        );
                        if let Some(previous) = pollers.insert(kind, handle) {
                            engine_warn!(
                                "Replacing {} poll loop for task {}",
                                kind,
                                previous.task_id()
                            );
                            previous.cancel();
                        }
                    }
                    EngineCommand::StopPolling { kind, task_id } => {
                        // A stop for a replaced task must not cancel its successor.
                        match pollers.get(&kind) {
                            Some(handle) if handle.task_id() == task_id => {
                                engine_debug!("Stopping {} poll loop for task {}", kind, task_id);
                                handle.cancel();
                                pollers.remove(&kind);
                            }
                            Some(handle) => engine_debug!(
                                "Ignoring stop for {} task {}; polling {}",
                                kind,
                                task_id,
                                handle.task_id()
                            ),
                            None => {}
                        }
                    }
                    EngineCommand::Shutdown => break,
                    other => {
                        let client = client.clone();
                        let sink = sink.clone();
                        runtime.spawn(async move {
                            handle_command(client.as_ref(), other, sink.as_ref()).await;
                        });
                    }
                }
                pollers.retain(|_, handle| !handle.is_finished());
            }

            for handle in pollers.values() {
                handle.cancel();
            }
            engine_debug!("Engine thread stopped");
        });

        Self { cmd_tx, event_rx }
    }

    pub fn submit(&self, request: SubmitRequest) {
        self.send(EngineCommand::Submit(request));
    }

    /// Starts polling `task_id`, replacing any loop already running for `kind`.
    pub fn start_polling(&self, kind: JobKind, task_id: impl Into<TaskId>) {
        self.send(EngineCommand::StartPolling {
            kind,
            task_id: task_id.into(),
        });
    }

    /// Stops the `kind` loop if it is still polling `task_id`.
    pub fn stop_polling(&self, kind: JobKind, task_id: impl Into<TaskId>) {
        self.send(EngineCommand::StopPolling {
            kind,
            task_id: task_id.into(),
        });
    }

    pub fn list_files(&self) {
        self.send(EngineCommand::ListFiles);
    }

    pub fn load_analysis(&self, filename: impl Into<String>) {
        self.send(EngineCommand::LoadAnalysis {
            filename: filename.into(),
        });
    }

    pub fn download(&self, filename: impl Into<String>, dest_dir: impl Into<PathBuf>) {
        self.send(EngineCommand::Download {
            filename: filename.into(),
            dest_dir: dest_dir.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks for the next event. `Disconnected` means the engine thread is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }

    pub fn shutdown(&self) {
        self.send(EngineCommand::Shutdown);
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            engine_warn!("Engine thread is no longer running; command dropped");
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }
}

async fn handle_command(client: &dyn ApiClient, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::Submit(request) => {
            let kind = request.kind();
            let event = match client.submit(&request).await {
                Ok(task_id) => {
                    engine_info!("Submitted {} job, task id {}", kind, task_id);
                    EngineEvent::Submitted { kind, task_id }
                }
                Err(error) => {
                    engine_warn!("Submitting {} job failed: {}", kind, error);
                    EngineEvent::SubmitFailed { kind, error }
                }
            };
            sink.emit(event);
        }
        EngineCommand::ListFiles => {
            let result = client.data_files().await;
            if let Err(err) = &result {
                engine_warn!("Listing data files failed: {}", err);
            }
            sink.emit(EngineEvent::FilesListed(result));
        }
        EngineCommand::LoadAnalysis { filename } => {
            let result = client.analysis_result(&filename).await;
            sink.emit(EngineEvent::AnalysisLoaded { filename, result });
        }
        EngineCommand::Download { filename, dest_dir } => {
            let result = download_to(client, &filename, dest_dir).await;
            match &result {
                Ok(path) => engine_info!("Downloaded {} to {:?}", filename, path),
                Err(err) => engine_warn!("Downloading {} failed: {}", filename, err),
            }
            sink.emit(EngineEvent::Downloaded { filename, result });
        }
        EngineCommand::StartPolling { .. }
        | EngineCommand::StopPolling { .. }
        | EngineCommand::Shutdown => {}
    }
}

async fn download_to(
    client: &dyn ApiClient,
    filename: &str,
    dest_dir: PathBuf,
) -> Result<PathBuf, ApiError> {
    let bytes = client.download(filename).await?;
    let filename = filename.to_string();
    let writer = AtomicFileWriter::new(dest_dir);
    let written = tokio::task::spawn_blocking(move || writer.write(&filename, &bytes))
        .await
        .map_err(|err| ApiError::new(crate::FailureKind::Io, err.to_string()))??;
    Ok(written)
}
