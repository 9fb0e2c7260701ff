//! Dashboard engine: backend HTTP client, poll loops and effect execution.
mod client;
mod engine;
mod persist;
mod poller;
mod types;

pub use client::{ApiClient, ClientSettings, ReqwestApiClient};
pub use engine::{EngineHandle, EngineSettings, RecvTimeoutError};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poller::{poll_task, ChannelEventSink, EventSink, PollExit, PollHandle, PollSettings};
pub use types::{
    ApiError, DataFiles, EngineEvent, FailureKind, JobKind, RemoteStatus, SubmitRequest, TaskId,
    TaskStatus,
};
