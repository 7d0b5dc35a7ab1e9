use std::time::Duration;

use crate::{ExamId, JobId, SelectedFile, StatusOrigin, Theme};

/// Delay before the progress indicator is dismissed after a submission.
pub const AUTO_CANCEL_DELAY: Duration = Duration::from_millis(1500);
/// How long a flash message stays visible.
pub const FLASH_DURATION: Duration = Duration::from_millis(2000);
/// Delay before a full reload after a response we cannot render inline.
pub const RELOAD_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// POST the selected file to the upload endpoint.
    UploadPdf { card_id: String, file: SelectedFile },
    /// Write the job id to durable storage, replacing any previous one.
    PersistJobId(JobId),
    /// Remove the job id from durable storage.
    ClearJobId,
    QueryJobStatus { job_id: JobId, origin: StatusOrigin },
    OpenJobChannel { job_id: JobId },
    DeleteExam { exam_id: ExamId },
    PersistTheme(Theme),
    OpenLoginPage { path: String },
    /// One-shot timer; fires `Msg::TimerFired(timer)` after `after`.
    StartTimer { timer: Timer, after: Duration },
    /// Drop in-memory state and run the page-load sequence again.
    ReloadPage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    UploadAutoCancel,
    /// Tagged with the flash generation it was started for.
    FlashExpiry(u64),
    Reload,
}
