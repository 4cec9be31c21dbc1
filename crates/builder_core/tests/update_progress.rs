use std::sync::Once;

use builder_core::{update, AppState, FormField, Msg, UiMode, HISTORY_DECAY, WAITING_MESSAGE};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(builder_logging::initialize_for_tests);
}

fn progress(state: AppState, text: &str) -> AppState {
    update(state, Msg::ProgressMessage(text.to_string())).0
}

fn loading_state() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::FieldChanged {
            field: FormField::Name,
            value: "worker".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::FileSelected {
            path: "jobs.py".to_string(),
        },
    );
    let (state, _) = update(state, Msg::SubmitClicked);
    assert_eq!(state.mode(), UiMode::Loading);
    state
}

#[test]
fn two_progress_messages_leave_one_faded_history_entry() {
    init_logging();
    let state = progress(AppState::new(), "A");
    let state = progress(state, "B");
    let view = state.view();

    assert_eq!(view.status, "B");
    let faded: Vec<_> = view.history.iter().filter(|e| e.text == "A").collect();
    assert_eq!(faded.len(), 1);
    assert!(faded[0].opacity() < 1.0);
    assert_eq!(view.debug_log, vec!["A", "B"]);
}

#[test]
fn history_fades_multiplicatively_newest_first() {
    init_logging();
    let state = loading_state();
    let state = progress(state, "one");
    let state = progress(state, "two");
    let state = progress(state, "three");
    let view = state.view();

    let texts: Vec<_> = view.history.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["two", "one", WAITING_MESSAGE]);
    let steps: Vec<_> = view.history.iter().map(|e| e.fade_steps).collect();
    assert_eq!(steps, vec![1, 2, 3]);
    assert!((view.history[0].opacity() - HISTORY_DECAY).abs() < f32::EPSILON);
    assert!((view.history[2].opacity() - HISTORY_DECAY.powi(3)).abs() < 1e-6);
}

#[test]
fn debug_message_only_touches_debug_log() {
    init_logging();
    let state = loading_state();
    let before = state.view();
    let (mut state, effects) = update(state, Msg::DebugMessage("\tpip install".to_string()));
    let view = state.view();

    assert!(effects.is_empty());
    assert_eq!(view.status, before.status);
    assert_eq!(view.history, before.history);
    assert_eq!(view.debug_log, vec!["\tpip install"]);
    assert!(state.consume_dirty());
}

#[test]
fn history_is_unbounded_until_next_submit() {
    init_logging();
    let mut state = loading_state();
    for i in 0..250 {
        state = progress(state, &format!("step {i}"));
    }
    assert_eq!(state.view().history.len(), 250);

    let (state, _) = update(state, Msg::BuildFailed {
        reason: "connection refused".to_string(),
    });
    let (state, _) = update(state, Msg::RestartClicked);
    let (state, _) = update(state, Msg::SubmitClicked);
    let view = state.view();
    assert!(view.history.is_empty());
    assert!(view.debug_log.is_empty());
    assert_eq!(view.status, WAITING_MESSAGE);
}

#[test]
fn channel_session_is_tracked() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::ChannelConnected {
            session_id: Some("abc".to_string()),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(state.session_id(), Some("abc"));
    assert!(state.view().connected);

    let (state, _) = update(state, Msg::ChannelDisconnected);
    assert_eq!(state.session_id(), None);
    assert!(!state.view().connected);
}
