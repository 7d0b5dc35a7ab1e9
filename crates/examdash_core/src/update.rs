use dash_logging::{dash_debug, dash_info, dash_job, dash_warn};

use crate::validate::validate_pdf;
use crate::{
    AppState, ChannelOutcome, Effect, ExamResult, FlashSeverity, JobId, JobStatus, Msg,
    PendingDelete, RequestFailure, StatusOrigin, Theme, Timer, UploadReply, AUTO_CANCEL_DELAY,
    FLASH_DURATION, LOGIN_PATH, RELOAD_DELAY,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ThemeRestored {
            saved,
            prefers_dark,
        } => {
            let theme = saved.unwrap_or(if prefers_dark {
                Theme::Dark
            } else {
                Theme::Light
            });
            state.set_theme(theme);
            Vec::new()
        }
        Msg::ThemeToggled => {
            let theme = state.theme().toggled();
            state.set_theme(theme);
            vec![Effect::PersistTheme(theme)]
        }
        Msg::RestoreJob(None) => Vec::new(),
        Msg::RestoreJob(Some(job_id)) => {
            dash_job!(info, job_id, "restoring persisted job");
            state.begin_restore(job_id.clone());
            state.begin_status_query();
            vec![Effect::QueryJobStatus {
                job_id,
                origin: StatusOrigin::Restore,
            }]
        }
        Msg::FileChosen(candidate) => match validate_pdf(candidate) {
            Ok(file) => {
                dash_debug!("selected {} ({} bytes)", file.name, file.size);
                state.select_file(file);
                Vec::new()
            }
            Err(err) => {
                dash_info!("rejected file selection: {:?}", err);
                flash(&mut state, err.to_string(), FlashSeverity::Error)
            }
        },
        Msg::FileRemoved | Msg::UploadCancelled => {
            state.reset_form();
            Vec::new()
        }
        Msg::UploadSubmitted { issued_at_ms } => submit_upload(&mut state, issued_at_ms),
        Msg::UploadFinished(result) => {
            state.end_upload();
            apply_upload_result(&mut state, result)
        }
        Msg::JobStatusReceived {
            job_id,
            origin,
            result,
            received_at_ms,
        } => {
            state.end_status_query();
            if origin == StatusOrigin::Restore {
                state.finish_restore(&job_id);
            }
            apply_job_status(&mut state, job_id, origin, result, received_at_ms)
        }
        Msg::ChannelEnded { job_id, outcome } => {
            state.end_channel();
            match outcome {
                ChannelOutcome::Completed => {
                    dash_job!(info, job_id, "completion signalled, fetching status");
                    state.begin_status_query();
                    vec![Effect::QueryJobStatus {
                        job_id,
                        origin: StatusOrigin::Channel,
                    }]
                }
                ChannelOutcome::Closed => {
                    dash_job!(warn, job_id, "channel closed before completion");
                    state.mark_orphaned(job_id);
                    Vec::new()
                }
                ChannelOutcome::Failed(reason) => {
                    dash_job!(warn, job_id, "channel failed: {}", reason);
                    state.mark_orphaned(job_id);
                    Vec::new()
                }
            }
        }
        Msg::DeleteRequested { exam_id, exam_name } => {
            state.open_delete_modal(PendingDelete { exam_id, exam_name });
            Vec::new()
        }
        Msg::DeleteCancelled => {
            state.take_pending_delete();
            Vec::new()
        }
        Msg::DeleteConfirmed => match state.take_pending_delete() {
            Some(pending) => {
                state.begin_delete();
                vec![Effect::DeleteExam {
                    exam_id: pending.exam_id,
                }]
            }
            None => Vec::new(),
        },
        Msg::DeleteFinished { exam_id, result } => {
            state.end_delete();
            match result {
                Ok(()) => {
                    state.remove_exam_card(&exam_id);
                    flash(&mut state, "Exam deleted successfully.", FlashSeverity::Success)
                }
                Err(RequestFailure::Network(reason)) => {
                    dash_warn!("delete of exam {} failed: {}", exam_id, reason);
                    flash(&mut state, "Error deleting exam.", FlashSeverity::Error)
                }
                Err(failure) => {
                    dash_warn!("delete of exam {} rejected: {}", exam_id, failure);
                    flash(&mut state, "Failed to delete exam.", FlashSeverity::Error)
                }
            }
        }
        Msg::LoginClicked => {
            if state.login_redirecting() {
                Vec::new()
            } else {
                state.start_login_redirect();
                vec![Effect::OpenLoginPage {
                    path: LOGIN_PATH.to_string(),
                }]
            }
        }
        Msg::TimerFired(Timer::UploadAutoCancel) => {
            // Dismisses the form only; the request keeps running.
            state.hide_progress();
            state.reset_form();
            Vec::new()
        }
        Msg::TimerFired(Timer::FlashExpiry(generation)) => {
            state.expire_flash(generation);
            Vec::new()
        }
        Msg::TimerFired(Timer::Reload) => {
            state.end_reload();
            vec![Effect::ReloadPage]
        }
    };

    (state, effects)
}

fn submit_upload(state: &mut AppState, issued_at_ms: i64) -> Vec<Effect> {
    let Some(file) = state.selected_file().cloned() else {
        return flash(state, "Please select a file first", FlashSeverity::Error);
    };
    // A restored job may still turn out to be processing and claim the placeholder.
    if state.current_loading().is_some() || state.restoring() {
        return flash(
            state,
            "An upload is already being processed",
            FlashSeverity::Error,
        );
    }

    let card_id = state.create_loading_card(issued_at_ms, file.name.clone());
    state.show_progress();
    state.begin_upload();
    dash_info!("uploading {} as card {}", file.name, card_id);

    vec![
        Effect::UploadPdf { card_id, file },
        Effect::StartTimer {
            timer: Timer::UploadAutoCancel,
            after: AUTO_CANCEL_DELAY,
        },
    ]
}

fn apply_upload_result(
    state: &mut AppState,
    result: Result<UploadReply, RequestFailure>,
) -> Vec<Effect> {
    match result {
        Ok(reply) => {
            state.complete_form();
            match reply {
                UploadReply::Finished(exam) => {
                    dash_info!("upload finished inline as exam {}", exam.exam_id);
                    promote(state, exam)
                }
                UploadReply::Queued { job_id } => {
                    dash_job!(info, job_id, "upload accepted, waiting for completion");
                    state.track_job(job_id.clone());
                    state.begin_channel();
                    vec![
                        Effect::PersistJobId(job_id.clone()),
                        Effect::OpenJobChannel { job_id },
                    ]
                }
                UploadReply::Incomplete => {
                    dash_warn!("upload response carried neither a result nor a job id");
                    state.remove_loading_card();
                    schedule_reload(state)
                }
            }
        }
        Err(failure) => {
            dash_warn!("upload failed: {}", failure);
            state.remove_loading_card();
            state.hide_progress();
            let message = match failure {
                RequestFailure::Rejected {
                    detail: Some(detail),
                    ..
                } => detail,
                RequestFailure::Network(_) => "Network error occurred".to_string(),
                RequestFailure::Rejected { detail: None, .. } | RequestFailure::Malformed(_) => {
                    "Upload failed".to_string()
                }
            };
            flash(state, message, FlashSeverity::Error)
        }
    }
}

fn apply_job_status(
    state: &mut AppState,
    job_id: JobId,
    origin: StatusOrigin,
    result: Result<JobStatus, RequestFailure>,
    received_at_ms: i64,
) -> Vec<Effect> {
    if state.placeholder_owned_elsewhere(&job_id) {
        return apply_unrelated_status(state, job_id, result);
    }
    match result {
        Err(failure) => {
            dash_job!(warn, job_id, "status query failed: {}", failure);
            state.untrack_job();
            match origin {
                // Unknown or deleted job: forget it quietly.
                StatusOrigin::Restore => vec![Effect::ClearJobId],
                StatusOrigin::Channel => {
                    state.remove_loading_card();
                    let mut effects = vec![Effect::ClearJobId];
                    effects.extend(flash(
                        state,
                        "Failed to fetch the exam status",
                        FlashSeverity::Error,
                    ));
                    effects
                }
            }
        }
        Ok(JobStatus::Error) => {
            dash_job!(warn, job_id, "server reported processing error");
            state.untrack_job();
            state.remove_loading_card();
            let mut effects = vec![Effect::ClearJobId];
            effects.extend(flash(
                state,
                "Exam processing failed",
                FlashSeverity::Error,
            ));
            effects
        }
        Ok(JobStatus::Processing) => match origin {
            StatusOrigin::Restore => {
                dash_job!(info, job_id, "still processing, reopening channel");
                if state.current_loading().is_none() {
                    state.create_loading_card(received_at_ms, format!("job {job_id}"));
                }
                state.track_job(job_id.clone());
                state.begin_channel();
                vec![Effect::OpenJobChannel { job_id }]
            }
            StatusOrigin::Channel => {
                // The channel is gone; leave the placeholder for the next page load.
                dash_job!(warn, job_id, "signalled but still processing");
                state.mark_orphaned(job_id);
                Vec::new()
            }
        },
        Ok(JobStatus::Done(Some(exam))) => {
            dash_job!(info, job_id, "done as exam {}", exam.exam_id);
            promote(state, exam)
        }
        Ok(JobStatus::Done(None)) => {
            dash_job!(warn, job_id, "done without a result");
            state.untrack_job();
            state.remove_loading_card();
            let mut effects = vec![Effect::ClearJobId];
            effects.extend(schedule_reload(state));
            effects
        }
    }
}

/// Status of a job other than the one behind the current placeholder.
///
/// The placeholder is left alone. The stored reference is only cleared when
/// it still names this job.
fn apply_unrelated_status(
    state: &mut AppState,
    job_id: JobId,
    result: Result<JobStatus, RequestFailure>,
) -> Vec<Effect> {
    dash_job!(info, job_id, "status arrived while another upload owns the placeholder");
    let tracked_here = state.tracked_job() == Some(job_id.as_str());
    let stored_here = tracked_here || state.tracked_job().is_none();
    let mut effects = Vec::new();
    if stored_here && !matches!(result, Ok(JobStatus::Processing)) {
        if tracked_here {
            state.untrack_job();
        }
        effects.push(Effect::ClearJobId);
    }
    match result {
        Ok(JobStatus::Done(Some(exam))) => {
            state.insert_exam_card(exam);
        }
        Ok(JobStatus::Error) => {
            effects.extend(flash(state, "Exam processing failed", FlashSeverity::Error));
        }
        Ok(JobStatus::Processing) => {
            dash_job!(warn, job_id, "still processing; not followed while another upload runs");
        }
        Ok(JobStatus::Done(None)) | Err(_) => {}
    }
    effects
}

fn promote(state: &mut AppState, exam: ExamResult) -> Vec<Effect> {
    state.promote_loading_card(exam);
    state.untrack_job();
    vec![Effect::ClearJobId]
}

fn schedule_reload(state: &mut AppState) -> Vec<Effect> {
    state.begin_reload();
    vec![Effect::StartTimer {
        timer: Timer::Reload,
        after: RELOAD_DELAY,
    }]
}

fn flash(state: &mut AppState, text: impl Into<String>, severity: FlashSeverity) -> Vec<Effect> {
    let generation = state.show_flash(text, severity);
    vec![Effect::StartTimer {
        timer: Timer::FlashExpiry(generation),
        after: FLASH_DURATION,
    }]
}
