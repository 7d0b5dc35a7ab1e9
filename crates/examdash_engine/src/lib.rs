//! Examdash engine: dashboard API client, job notifications and durable storage.
mod api;
mod channel;
mod engine;
mod storage;
mod types;

pub use api::{ClientSettings, DashboardApi, ReqwestDashboardApi};
pub use channel::{JobNotifier, WebSocketNotifier, ACK_TOKEN, DONE_SENTINEL, ERROR_SENTINEL};
pub use engine::{EngineEvents, EngineHandle};
pub use storage::{ClientStorage, StorageError, JOB_ID_KEY, STATE_FILENAME, THEME_KEY};
pub use types::{
    ApiError, ChannelEnd, ChannelError, EngineEvent, ExamSummary, FailureKind, JobState,
    JobStatusReport, QueryOrigin, Sentinel, UploadOutcome,
};
