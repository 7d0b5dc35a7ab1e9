use examdash_core::{update, AppState, Msg};

#[test]
fn cancelling_a_missing_delete_changes_nothing() {
    let state = AppState::new();
    let (mut next, effects) = update(state.clone(), Msg::DeleteCancelled);
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
    assert_eq!(state, next);

    let (next, effects) = update(next, Msg::DeleteConfirmed);
    assert!(effects.is_empty());
    assert_eq!(state, next);
}

#[test]
fn restoring_nothing_twice_touches_nothing() {
    let state = AppState::new();
    let before = state.view();

    let (mut once, effects) = update(state, Msg::RestoreJob(None));
    assert!(effects.is_empty());
    assert!(!once.consume_dirty());

    let (mut twice, effects) = update(once, Msg::RestoreJob(None));
    assert!(effects.is_empty());
    assert!(!twice.consume_dirty());
    assert_eq!(twice.view(), before);
}
