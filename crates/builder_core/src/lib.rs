//! Builder core: pure state machine and view-model helpers for the build form.
mod effect;
mod form;
mod msg;
mod result;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use form::{BuildForm, FormData, FormEntry, FormError, FormField, PACKAGE_PLACEHOLDER};
pub use msg::Msg;
pub use result::{
    BuildResult, ResultIndicator, ResultPanel, Section, CRITICAL_ERROR_MESSAGE, JOBS_LABEL,
    SUCCESS_RESULT, TASKS_LABEL,
};
pub use state::{AppState, UiMode, WAITING_MESSAGE};
pub use update::update;
pub use view_model::{AppViewModel, HistoryEntry, HISTORY_DECAY};
