use std::collections::VecDeque;

use crate::view_model::{AppViewModel, HistoryEntry};
use crate::{BuildForm, BuildResult, FormField, ResultPanel};

pub const WAITING_MESSAGE: &str = "Please wait, this might take a while...";

/// Mutually exclusive visible panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    #[default]
    Form,
    Loading,
    Result,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    mode: UiMode,
    form: BuildForm,
    session_id: Option<String>,
    status: String,
    history: VecDeque<HistoryEntry>,
    debug_log: Vec<String>,
    result: ResultPanel,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            mode: self.mode,
            form: self.form.clone(),
            connected: self.session_id.is_some(),
            status: self.status.clone(),
            history: self.history.iter().cloned().collect(),
            debug_log: self.debug_log.clone(),
            result: self.result.clone(),
            dirty: self.dirty,
        }
    }

    pub fn mode(&self) -> UiMode {
        self.mode
    }

    pub fn form(&self) -> &BuildForm {
        &self.form
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_field(&mut self, field: FormField, value: &str) {
        self.form.set_field(field, value);
        self.mark_dirty();
    }

    pub(crate) fn select_file(&mut self, path: &str) {
        self.form.select_file(path);
        self.mark_dirty();
    }

    pub(crate) fn set_session(&mut self, session_id: Option<String>) {
        self.session_id = session_id;
        self.mark_dirty();
    }

    /// Demotes the current status line into the history and fades the trail.
    pub(crate) fn push_progress(&mut self, text: String) {
        let previous = std::mem::replace(&mut self.status, text.clone());
        self.history.push_front(HistoryEntry {
            text: previous,
            fade_steps: 0,
        });
        for entry in &mut self.history {
            entry.fade_steps += 1;
        }
        self.debug_log.push(text);
        self.mark_dirty();
    }

    pub(crate) fn push_debug(&mut self, text: String) {
        self.debug_log.push(text);
        self.mark_dirty();
    }

    pub(crate) fn begin_loading(&mut self, status: &str) {
        self.debug_log.clear();
        self.history.clear();
        self.status = status.to_string();
        self.mode = UiMode::Loading;
        self.mark_dirty();
    }

    pub(crate) fn show_response(&mut self, result: &BuildResult) {
        self.result.apply_response(result);
        self.mode = UiMode::Result;
        self.mark_dirty();
    }

    pub(crate) fn show_transport_failure(&mut self) {
        self.result.apply_transport_failure();
        self.mode = UiMode::Result;
        self.mark_dirty();
    }

    pub(crate) fn show_form(&mut self) {
        self.mode = UiMode::Form;
        self.mark_dirty();
    }
}
