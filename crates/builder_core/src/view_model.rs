use crate::{BuildForm, ResultPanel, UiMode};

/// Opacity multiplier applied to every history entry per new progress line.
pub const HISTORY_DECAY: f32 = 0.6;

/// A demoted status line in the loading panel's fading trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub text: String,
    pub fade_steps: u32,
}

impl HistoryEntry {
    pub fn opacity(&self) -> f32 {
        HISTORY_DECAY.powi(i32::try_from(self.fade_steps).unwrap_or(i32::MAX))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub mode: UiMode,
    pub form: BuildForm,
    pub connected: bool,
    pub status: String,
    /// Newest entry first.
    pub history: Vec<HistoryEntry>,
    pub debug_log: Vec<String>,
    pub result: ResultPanel,
    pub dirty: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_never_rises_for_very_old_entries() {
        let entry = HistoryEntry {
            text: "old".to_string(),
            fade_steps: u32::MAX,
        };
        assert_eq!(entry.opacity(), 0.0);

        let just_past = HistoryEntry {
            fade_steps: i32::MAX as u32 + 1,
            ..entry
        };
        assert!(just_past.opacity() <= HISTORY_DECAY);
    }
}
