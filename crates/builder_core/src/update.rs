use crate::state::WAITING_MESSAGE;
use crate::{AppState, Effect, Msg, UiMode};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FieldChanged { field, value } => {
            state.set_field(field, &value);
            Vec::new()
        }
        Msg::FileSelected { path } => {
            state.select_file(&path);
            Vec::new()
        }
        Msg::ChannelConnected { session_id } => {
            state.set_session(session_id);
            Vec::new()
        }
        Msg::ChannelDisconnected => {
            state.set_session(None);
            Vec::new()
        }
        Msg::ProgressMessage(text) => {
            state.push_progress(text);
            Vec::new()
        }
        Msg::DebugMessage(text) => {
            state.push_debug(text);
            Vec::new()
        }
        Msg::SubmitClicked => {
            // One request in flight at a time.
            if state.mode() == UiMode::Loading || state.form().validate().is_err() {
                return (state, Vec::new());
            }
            state.begin_loading(WAITING_MESSAGE);
            vec![Effect::SendBuildRequest]
        }
        Msg::BuildResponded(result) => {
            state.show_response(&result);
            Vec::new()
        }
        Msg::BuildFailed { reason: _ } => {
            state.show_transport_failure();
            Vec::new()
        }
        Msg::RestartClicked => {
            state.show_form();
            Vec::new()
        }
    };

    (state, effects)
}
