//! Examdash core: pure dashboard state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod validate;
mod view_model;

pub use effect::{Effect, Timer, AUTO_CANCEL_DELAY, FLASH_DURATION, RELOAD_DELAY};
pub use msg::{ChannelOutcome, JobStatus, Msg, RequestFailure, StatusOrigin, UploadReply};
pub use state::{
    AppState, CardKey, ExamCard, ExamId, ExamResult, Flash, FlashSeverity, JobId,
    PendingDelete, SelectedFile, Theme,
};
pub use update::update;
pub use validate::{validate_pdf, FileCandidate, ValidationError, MAX_UPLOAD_BYTES, PDF_MIME};
pub use view_model::{
    exam_path, format_file_size, AppViewModel, CardKind, CardView, DeleteModalView, FlashView,
    UploadFormView, LOGIN_PATH,
};
