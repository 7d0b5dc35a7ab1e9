use std::fmt;

use crate::{ExamId, ExamResult, FileCandidate, JobId, Theme, Timer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Saved theme read from storage at page load.
    ThemeRestored {
        saved: Option<Theme>,
        prefers_dark: bool,
    },
    /// User clicked the theme toggle.
    ThemeToggled,
    /// Persisted job reference read from storage at page load.
    RestoreJob(Option<JobId>),
    /// User picked (or dropped) a file.
    FileChosen(FileCandidate),
    /// User removed the selected file.
    FileRemoved,
    /// User clicked Cancel on the upload form.
    UploadCancelled,
    /// User submitted the upload form. `issued_at_ms` seeds the placeholder id.
    UploadSubmitted { issued_at_ms: i64 },
    /// Upload request completed.
    UploadFinished(Result<UploadReply, RequestFailure>),
    /// Job-status request completed.
    JobStatusReceived {
        job_id: JobId,
        origin: StatusOrigin,
        result: Result<JobStatus, RequestFailure>,
        received_at_ms: i64,
    },
    /// Notification channel for a job finished, one way or another.
    ChannelEnded {
        job_id: JobId,
        outcome: ChannelOutcome,
    },
    /// User clicked the delete control on a result card.
    DeleteRequested { exam_id: ExamId, exam_name: String },
    DeleteCancelled,
    DeleteConfirmed,
    /// Delete request completed.
    DeleteFinished {
        exam_id: ExamId,
        result: Result<(), RequestFailure>,
    },
    LoginClicked,
    TimerFired(Timer),
}

/// Successful upload response, classified by what it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadReply {
    /// The server processed the file inline.
    Finished(ExamResult),
    /// The server accepted the file and is processing it as a job.
    Queued { job_id: JobId },
    /// Success status, but neither a result nor a job id.
    Incomplete,
}

/// Server-reported job state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Processing,
    Done(Option<ExamResult>),
    Error,
}

/// Which flow asked for the job status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOrigin {
    /// Page load found a persisted job id.
    Restore,
    /// The notification channel signalled completion.
    Channel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelOutcome {
    /// The server sent its completion sentinel; the client acknowledged it.
    Completed,
    /// The channel closed before any sentinel arrived.
    Closed,
    Failed(String),
}

/// Transport-level failure of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestFailure {
    /// Non-success HTTP status, with the server's `detail` if it sent one.
    Rejected { status: u16, detail: Option<String> },
    Network(String),
    /// Success status but the body was not the JSON we expected.
    Malformed(String),
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestFailure::Rejected {
                status,
                detail: Some(detail),
            } => write!(f, "http status {status}: {detail}"),
            RequestFailure::Rejected {
                status,
                detail: None,
            } => write!(f, "http status {status}"),
            RequestFailure::Network(message) => write!(f, "network error: {message}"),
            RequestFailure::Malformed(message) => write!(f, "malformed response: {message}"),
        }
    }
}
