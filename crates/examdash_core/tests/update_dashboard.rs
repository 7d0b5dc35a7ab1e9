use std::sync::Once;

use examdash_core::{
    update, AppState, Effect, ExamCard, ExamResult, FlashSeverity, JobStatus, Msg, RequestFailure,
    StatusOrigin, Theme, Timer, FLASH_DURATION,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(dash_logging::initialize_for_tests);
}

/// Board with one result card for exam 42, reached through restoration.
fn board_with_exam() -> AppState {
    let (state, _) = update(AppState::new(), Msg::RestoreJob(Some("job-1".to_string())));
    let (state, _) = update(
        state,
        Msg::JobStatusReceived {
            job_id: "job-1".to_string(),
            origin: StatusOrigin::Restore,
            result: Ok(JobStatus::Done(Some(ExamResult {
                exam_id: "42".to_string(),
                exam_name: "Midterm".to_string(),
            }))),
            received_at_ms: 0,
        },
    );
    state
}

fn request_delete(state: AppState) -> AppState {
    let (state, effects) = update(
        state,
        Msg::DeleteRequested {
            exam_id: "42".to_string(),
            exam_name: "Midterm".to_string(),
        },
    );
    assert!(effects.is_empty());
    state
}

#[test]
fn delete_requires_confirmation() {
    init_logging();
    let state = request_delete(board_with_exam());
    let modal = state.view().delete_modal.expect("modal open");
    assert_eq!(modal.exam_id, "42");

    let (state, effects) = update(state, Msg::DeleteCancelled);
    assert!(effects.is_empty());
    assert!(state.pending_delete().is_none());
    assert_eq!(state.cards().len(), 1);

    // Confirming with nothing pending does nothing.
    let (_state, effects) = update(state, Msg::DeleteConfirmed);
    assert!(effects.is_empty());
}

#[test]
fn confirmed_delete_removes_card_on_success() {
    init_logging();
    let state = request_delete(board_with_exam());
    let (state, effects) = update(state, Msg::DeleteConfirmed);

    assert_eq!(
        effects,
        vec![Effect::DeleteExam {
            exam_id: "42".to_string()
        }]
    );
    assert!(state.pending_delete().is_none());
    assert_eq!(state.view().in_flight, 1);

    let (state, _) = update(
        state,
        Msg::DeleteFinished {
            exam_id: "42".to_string(),
            result: Ok(()),
        },
    );
    assert!(state.cards().is_empty());
    let flash = state.flash().unwrap();
    assert_eq!(flash.text, "Exam deleted successfully.");
    assert_eq!(flash.severity, FlashSeverity::Success);
}

#[test]
fn failed_delete_keeps_card() {
    init_logging();
    let state = request_delete(board_with_exam());
    let (state, _) = update(state, Msg::DeleteConfirmed);
    let (state, _) = update(
        state,
        Msg::DeleteFinished {
            exam_id: "42".to_string(),
            result: Err(RequestFailure::Rejected {
                status: 404,
                detail: Some("Exam not found".to_string()),
            }),
        },
    );
    assert!(matches!(state.cards()[0], ExamCard::Ready { .. }));
    assert_eq!(state.flash().unwrap().text, "Failed to delete exam.");

    let state = request_delete(state);
    let (state, _) = update(state, Msg::DeleteConfirmed);
    let (state, _) = update(
        state,
        Msg::DeleteFinished {
            exam_id: "42".to_string(),
            result: Err(RequestFailure::Network("timed out".to_string())),
        },
    );
    assert_eq!(state.cards().len(), 1);
    assert_eq!(state.flash().unwrap().text, "Error deleting exam.");
}

#[test]
fn saved_theme_wins_over_preference() {
    init_logging();
    let (state, _) = update(
        AppState::new(),
        Msg::ThemeRestored {
            saved: Some(Theme::Light),
            prefers_dark: true,
        },
    );
    assert_eq!(state.theme(), Theme::Light);

    let (state, _) = update(
        AppState::new(),
        Msg::ThemeRestored {
            saved: None,
            prefers_dark: true,
        },
    );
    assert_eq!(state.theme(), Theme::Dark);
}

#[test]
fn theme_toggle_persists() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ThemeToggled);
    assert_eq!(state.theme(), Theme::Dark);
    assert_eq!(effects, vec![Effect::PersistTheme(Theme::Dark)]);

    let (state, effects) = update(state, Msg::ThemeToggled);
    assert_eq!(state.theme(), Theme::Light);
    assert_eq!(effects, vec![Effect::PersistTheme(Theme::Light)]);
}

#[test]
fn stale_flash_timer_does_not_hide_newer_flash() {
    init_logging();
    let (state, first) = update(AppState::new(), Msg::UploadSubmitted { issued_at_ms: 0 });
    assert_eq!(
        first,
        vec![Effect::StartTimer {
            timer: Timer::FlashExpiry(1),
            after: FLASH_DURATION,
        }]
    );
    let (state, _) = update(state, Msg::UploadSubmitted { issued_at_ms: 0 });

    let (state, _) = update(state, Msg::TimerFired(Timer::FlashExpiry(1)));
    assert!(state.flash().is_some());

    let (state, _) = update(state, Msg::TimerFired(Timer::FlashExpiry(2)));
    assert!(state.flash().is_none());
}

#[test]
fn login_redirects_once() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::LoginClicked);
    assert_eq!(
        effects,
        vec![Effect::OpenLoginPage {
            path: "/auth/login".to_string()
        }]
    );
    let view = state.view();
    assert!(!view.login_enabled);
    assert_eq!(view.login_label, "Redirecting...");

    let (_state, effects) = update(state, Msg::LoginClicked);
    assert!(effects.is_empty());
}
