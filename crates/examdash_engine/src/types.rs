use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSummary {
    pub exam_id: String,
    pub exam_name: String,
}

/// Successful `POST /upload-pdf`, classified by what the body carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Finished(ExamSummary),
    Queued { job_id: String },
    /// Success status without a result or a job id.
    Incomplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Processing,
    Done,
    Error,
}

/// Body of `GET /job-status/{jobId}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatusReport {
    pub state: JobState,
    /// Only read when `state` is `Done`.
    pub result: Option<ExamSummary>,
}

/// Terminal token pushed by the server on a job channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    Done,
    Error,
}

/// How a job channel ended without a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEnd {
    /// Sentinel received and acknowledged.
    Signalled(Sentinel),
    /// The server closed the channel before sending a sentinel.
    ClosedByServer,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("invalid channel url: {0}")]
    InvalidUrl(String),
    #[error("could not connect: {0}")]
    Connect(String),
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Why a status query was issued; carried through the engine untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOrigin {
    /// Reconciling a job id found in storage at page load.
    Restore,
    /// Following up on a completion signal from the job channel.
    Channel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UploadFinished {
        card_id: String,
        result: Result<UploadOutcome, ApiError>,
    },
    JobStatusFetched {
        job_id: String,
        origin: QueryOrigin,
        result: Result<JobStatusReport, ApiError>,
    },
    ChannelEnded {
        job_id: String,
        result: Result<ChannelEnd, ChannelError>,
    },
    DeleteFinished {
        exam_id: String,
        result: Result<(), ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
    /// `detail` field of an error body, shown to the user verbatim.
    pub detail: Option<String>,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: Option<String>) -> Self {
        self.detail = detail;
        self
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{}: {} ({detail})", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    /// The file to upload could not be read.
    LocalFile,
    HttpStatus(u16),
    Timeout,
    /// Success status with a body that is not the expected JSON.
    MalformedBody,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::LocalFile => write!(f, "local file error"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::MalformedBody => write!(f, "malformed body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
