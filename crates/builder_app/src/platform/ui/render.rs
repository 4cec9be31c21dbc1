use builder_core::{AppViewModel, ResultIndicator, ResultPanel, Section, UiMode};

/// Turns successive view models into terminal lines, printing only what
/// changed since the previous frame.
#[derive(Debug, Default)]
pub struct TerminalRenderer {
    show_debug: bool,
    last_mode: Option<UiMode>,
    last_status: Option<String>,
    debug_printed: usize,
}

impl TerminalRenderer {
    pub fn new(show_debug: bool) -> Self {
        Self {
            show_debug,
            ..Self::default()
        }
    }

    pub fn render(&mut self, view: &AppViewModel) -> Vec<String> {
        let entered = self.last_mode != Some(view.mode);
        self.last_mode = Some(view.mode);

        match view.mode {
            UiMode::Form if entered => form_lines(view),
            UiMode::Form => Vec::new(),
            UiMode::Loading => {
                if entered {
                    self.last_status = None;
                    self.debug_printed = 0;
                }
                self.loading_lines(view)
            }
            UiMode::Result if entered => {
                let mut lines = self.loading_lines(view);
                lines.extend(result_lines(&view.result, self.show_debug));
                lines
            }
            UiMode::Result => Vec::new(),
        }
    }

    fn loading_lines(&mut self, view: &AppViewModel) -> Vec<String> {
        let mut lines = Vec::new();
        if view.mode == UiMode::Loading && self.last_status.as_deref() != Some(view.status.as_str())
        {
            lines.push(format!("» {}", view.status));
            self.last_status = Some(view.status.clone());
        }
        if self.show_debug {
            let fresh = view.debug_log.iter().skip(self.debug_printed);
            lines.extend(fresh.map(|line| format!("  | {line}")));
            self.debug_printed = view.debug_log.len();
        }
        lines
    }
}

fn form_lines(view: &AppViewModel) -> Vec<String> {
    let form = &view.form;
    vec![
        format!("Image name : {}", form.name),
        format!("Package    : {}", form.package_label),
        format!("Tags       : {}", form.tags.join(" ")),
        format!("Imports    : {}", form.imports.join(" ")),
        format!("Pip        : {}", form.pip.join(" ")),
        format!("Apt        : {}", form.apt.join(" ")),
    ]
}

fn result_lines(result: &ResultPanel, show_details: bool) -> Vec<String> {
    let mut lines = vec![match result.indicator {
        Some(ResultIndicator::Success) => "✔ Build succeeded".to_string(),
        Some(ResultIndicator::Failure) | None => "✘ Build failed".to_string(),
    }];
    lines.extend(result.message_lines.iter().cloned());

    if result.image_visible && !result.uuid.is_empty() {
        lines.push(format!("Image: {}", result.uuid));
    }
    if !result.tags.is_empty() {
        let chips: Vec<_> = result.tags.iter().map(|tag| format!("[{tag}]")).collect();
        lines.push(format!("Tags: {}", chips.join(" ")));
    }
    if result.jobs_visible {
        if let Some(jobs) = &result.jobs {
            lines.extend(section_lines(jobs));
        }
    }
    if let Some(tasks) = &result.tasks {
        lines.extend(section_lines(tasks));
    }
    if show_details && !result.details.is_empty() {
        lines.push("Details:".to_string());
        lines.extend(result.details.lines().map(|line| format!("  {line}")));
    }
    lines
}

fn section_lines(section: &Section) -> Vec<String> {
    std::iter::once(section.label.clone())
        .chain(section.items.iter().map(|item| format!("  - {item}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use builder_core::{update, AppState, BuildResult, FormField, Msg};
    use pretty_assertions::assert_eq;

    fn loading() -> AppState {
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
                path: "job.py".to_string(),
            },
        );
        update(state, Msg::SubmitClicked).0
    }

    fn success(tasks: &[&str]) -> BuildResult {
        BuildResult {
            result: "success".to_string(),
            message: "Success! Image build OK!".to_string(),
            details: "log".to_string(),
            uuid: "9a1".to_string(),
            tags: vec!["a".to_string(), "b".to_string()],
            jobs: vec!["j1".to_string()],
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn status_lines_are_printed_once_each() {
        let mut renderer = TerminalRenderer::new(false);
        let state = loading();
        assert_eq!(
            renderer.render(&state.view()),
            vec!["» Please wait, this might take a while..."]
        );
        assert!(renderer.render(&state.view()).is_empty());

        let (state, _) = update(state, Msg::ProgressMessage("Building".to_string()));
        assert_eq!(renderer.render(&state.view()), vec!["» Building"]);
    }

    #[test]
    fn debug_lines_shown_only_when_enabled() {
        let mut renderer = TerminalRenderer::new(true);
        let state = loading();
        renderer.render(&state.view());
        let (state, _) = update(state, Msg::DebugMessage("pip install".to_string()));
        assert_eq!(renderer.render(&state.view()), vec!["  | pip install"]);
    }

    #[test]
    fn success_panel_lists_tags_and_jobs() {
        let mut renderer = TerminalRenderer::new(false);
        let state = loading();
        renderer.render(&state.view());
        let (state, _) = update(state, Msg::BuildResponded(success(&[])));

        assert_eq!(
            renderer.render(&state.view()),
            vec![
                "✔ Build succeeded",
                "Success! Image build OK!",
                "Image: 9a1",
                "Tags: [a] [b]",
                "This image will be able to execute the following jobs :",
                "  - j1",
            ]
        );
        assert!(renderer.render(&state.view()).is_empty());
    }

    #[test]
    fn sub_tasks_header_rendered_once() {
        let mut renderer = TerminalRenderer::new(false);
        let state = loading();
        renderer.render(&state.view());
        let (state, _) = update(state, Msg::BuildResponded(success(&["t1", "t2"])));

        let lines = renderer.render(&state.view());
        let headers = lines
            .iter()
            .filter(|line| line.as_str() == "And following sub tasks:")
            .count();
        assert_eq!(headers, 1);
        assert!(lines.ends_with(&["  - t1".to_string(), "  - t2".to_string()]));
    }

    #[test]
    fn failure_panel_hides_image_and_jobs() {
        let mut renderer = TerminalRenderer::new(false);
        let state = loading();
        renderer.render(&state.view());
        let (state, _) = update(
            state,
            Msg::BuildFailed {
                reason: "refused".to_string(),
            },
        );

        assert_eq!(
            renderer.render(&state.view()),
            vec!["✘ Build failed", "Critical error during build request"]
        );
    }

    #[test]
    fn restart_prints_the_form_again() {
        let mut renderer = TerminalRenderer::new(false);
        let state = loading();
        renderer.render(&state.view());
        let (state, _) = update(state, Msg::BuildResponded(success(&[])));
        renderer.render(&state.view());
        let (state, _) = update(state, Msg::RestartClicked);

        let lines = renderer.render(&state.view());
        assert_eq!(lines[0], "Image name : worker");
        assert_eq!(lines[1], "Package    : job.py");
    }
}
