use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use dash_logging::{dash_debug, dash_info, dash_job, dash_warn};
use examdash_core::{
    ChannelOutcome, Effect, ExamResult, JobStatus, Msg, RequestFailure, StatusOrigin, Timer,
    UploadReply,
};
use examdash_engine::{
    ApiError, ChannelEnd, ChannelError, EngineEvent, EngineEvents, EngineHandle, ExamSummary,
    FailureKind, JobState, JobStatusReport, QueryOrigin, UploadOutcome,
};

use super::persistence::Persistence;

/// Carries out effects other than `ReloadPage`, which the dispatch loop owns.
pub struct EffectRunner {
    engine: EngineHandle,
    persistence: Persistence,
    base_url: String,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(
        engine: EngineHandle,
        events: EngineEvents,
        persistence: Persistence,
        base_url: String,
        msg_tx: mpsc::Sender<Msg>,
    ) -> Self {
        let runner = Self {
            engine,
            persistence,
            base_url,
            msg_tx,
        };
        runner.spawn_event_loop(events);
        runner
    }

    pub fn run(&self, effect: Effect) {
        match effect {
            Effect::UploadPdf { card_id, file } => {
                dash_info!("UploadPdf card={} file={}", card_id, file.path.display());
                self.engine.upload(card_id, file.path, file.name);
            }
            Effect::PersistJobId(job_id) => self.persistence.save_job_id(&job_id),
            Effect::ClearJobId => self.persistence.clear_job_id(),
            Effect::QueryJobStatus { job_id, origin } => {
                self.engine.job_status(job_id, query_origin(origin));
            }
            Effect::OpenJobChannel { job_id } => self.engine.watch_job(job_id),
            Effect::DeleteExam { exam_id } => self.engine.delete_exam(exam_id),
            Effect::PersistTheme(theme) => self.persistence.save_theme(theme),
            Effect::OpenLoginPage { path } => {
                let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
                println!("Open {url} in your browser to sign in.");
            }
            Effect::StartTimer { timer, after } => self.start_timer(timer, after),
            Effect::ReloadPage => dash_warn!("ReloadPage reached the effect runner; ignored"),
        }
    }

    fn start_timer(&self, timer: Timer, after: Duration) {
        let msg_tx = self.msg_tx.clone();
        thread::spawn(move || {
            thread::sleep(after);
            if msg_tx.send(Msg::TimerFired(timer)).is_err() {
                dash_debug!("timer {:?} fired after shutdown", timer);
            }
        });
    }

    fn spawn_event_loop(&self, events: EngineEvents) {
        let msg_tx = self.msg_tx.clone();
        thread::spawn(move || {
            while let Some(event) = events.recv() {
                let msg = map_event(event);
                if msg_tx.send(msg).is_err() {
                    break;
                }
            }
        });
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadFinished { card_id, result } => {
            dash_debug!("upload for card {} finished", card_id);
            Msg::UploadFinished(map_upload(result))
        }
        EngineEvent::JobStatusFetched {
            job_id,
            origin,
            result,
        } => Msg::JobStatusReceived {
            job_id,
            origin: status_origin(origin),
            result: map_status(result),
            received_at_ms: Utc::now().timestamp_millis(),
        },
        EngineEvent::ChannelEnded { job_id, result } => {
            let outcome = map_channel(result);
            dash_job!(debug, job_id, "channel ended: {:?}", outcome);
            Msg::ChannelEnded { job_id, outcome }
        }
        EngineEvent::DeleteFinished { exam_id, result } => Msg::DeleteFinished {
            exam_id,
            result: result.map_err(api_error_to_failure),
        },
    }
}

fn query_origin(origin: StatusOrigin) -> QueryOrigin {
    match origin {
        StatusOrigin::Restore => QueryOrigin::Restore,
        StatusOrigin::Channel => QueryOrigin::Channel,
    }
}

fn status_origin(origin: QueryOrigin) -> StatusOrigin {
    match origin {
        QueryOrigin::Restore => StatusOrigin::Restore,
        QueryOrigin::Channel => StatusOrigin::Channel,
    }
}

fn exam_result(summary: ExamSummary) -> ExamResult {
    ExamResult {
        exam_id: summary.exam_id,
        exam_name: summary.exam_name,
    }
}

pub(crate) fn map_upload(
    result: Result<UploadOutcome, ApiError>,
) -> Result<UploadReply, RequestFailure> {
    match result {
        Ok(UploadOutcome::Finished(summary)) => Ok(UploadReply::Finished(exam_result(summary))),
        Ok(UploadOutcome::Queued { job_id }) => Ok(UploadReply::Queued { job_id }),
        Ok(UploadOutcome::Incomplete) => Ok(UploadReply::Incomplete),
        Err(err) => Err(api_error_to_failure(err)),
    }
}

pub(crate) fn map_status(
    result: Result<JobStatusReport, ApiError>,
) -> Result<JobStatus, RequestFailure> {
    let report = result.map_err(api_error_to_failure)?;
    Ok(match report.state {
        JobState::Processing => JobStatus::Processing,
        JobState::Done => JobStatus::Done(report.result.map(exam_result)),
        JobState::Error => JobStatus::Error,
    })
}

/// Either sentinel counts as completion; the follow-up status query tells them apart.
pub(crate) fn map_channel(result: Result<ChannelEnd, ChannelError>) -> ChannelOutcome {
    match result {
        Ok(ChannelEnd::Signalled(_)) => ChannelOutcome::Completed,
        Ok(ChannelEnd::ClosedByServer) => ChannelOutcome::Closed,
        Err(err) => ChannelOutcome::Failed(err.to_string()),
    }
}

pub(crate) fn api_error_to_failure(err: ApiError) -> RequestFailure {
    match err.kind {
        FailureKind::HttpStatus(status) => RequestFailure::Rejected {
            status,
            detail: err.detail,
        },
        FailureKind::MalformedBody => RequestFailure::Malformed(err.message),
        FailureKind::InvalidUrl
        | FailureKind::LocalFile
        | FailureKind::Timeout
        | FailureKind::Network => RequestFailure::Network(err.to_string()),
    }
}
