//! Periodic status polling for a single backend job.
//!
//! A poll loop owns one [`CancellationToken`]. It stops on its own once the
//! backend reports a terminal status or the optional deadline passes; the
//! engine cancels it when the job is replaced or the session ends.

use std::sync::{mpsc, Arc};
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{ApiClient, EngineEvent, JobKind, RemoteStatus, TaskId};

const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct PollSettings {
    pub interval: Duration,
    /// Give up on a job that has not finished after this long.
    pub max_duration: Option<Duration>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_duration: None,
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollExit {
    Terminal(RemoteStatus),
    TimedOut,
    Cancelled,
}

/// Polls `task_id` until it reaches a terminal status, the deadline passes or
/// `cancel` fires. The first request goes out one interval after the call, and
/// every tick sends its request before the deadline is checked.
///
/// Failed status requests are reported and retried on the next tick.
pub async fn poll_task(
    client: &dyn ApiClient,
    kind: JobKind,
    task_id: &str,
    settings: &PollSettings,
    sink: &dyn EventSink,
    cancel: &CancellationToken,
) -> PollExit {
    let period = settings.interval.max(MIN_POLL_INTERVAL);
    let started = Instant::now();
    let mut ticker = tokio::time::interval_at(started + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => return PollExit::Cancelled,
            _ = ticker.tick() => {}
        }

        let response = tokio::select! {
            _ = cancel.cancelled() => return PollExit::Cancelled,
            response = client.task_status(task_id) => response,
        };

        match response {
            Ok(status) => {
                let remote = status.status;
                engine_debug!(
                    "Task {} ({}) status={:?} progress={:?}",
                    task_id,
                    kind,
                    remote,
                    status.progress
                );
                sink.emit(EngineEvent::Status {
                    kind,
                    task_id: task_id.to_string(),
                    status,
                });
                if remote.is_terminal() {
                    engine_info!("Task {} ({}) finished with {:?}", task_id, kind, remote);
                    return PollExit::Terminal(remote);
                }
            }
            Err(error) => {
                engine_warn!("Polling {} task {} failed: {}", kind, task_id, error);
                sink.emit(EngineEvent::PollFailed {
                    kind,
                    task_id: task_id.to_string(),
                    error,
                });
            }
        }

        // Only a non-terminal answer can time out.
        if let Some(max_duration) = settings.max_duration {
            if started.elapsed() >= max_duration {
                engine_warn!("Polling {} task {} timed out after {:?}", kind, task_id, max_duration);
                sink.emit(EngineEvent::PollTimedOut {
                    kind,
                    task_id: task_id.to_string(),
                });
                return PollExit::TimedOut;
            }
        }
    }
}

/// A spawned poll loop and the token that stops it.
#[derive(Debug)]
pub struct PollHandle {
    task_id: TaskId,
    cancel: CancellationToken,
    join: JoinHandle<PollExit>,
}

impl PollHandle {
    /// Spawns a poll loop on the current tokio runtime.
    pub fn spawn(
        client: Arc<dyn ApiClient>,
        kind: JobKind,
        task_id: TaskId,
        settings: PollSettings,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();
        let loop_task_id = task_id.clone();
        let join = tokio::spawn(async move {
            poll_task(
                client.as_ref(),
                kind,
                &loop_task_id,
                &settings,
                sink.as_ref(),
                &loop_cancel,
            )
            .await
        });

        Self {
            task_id,
            cancel,
            join,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
