pub const SUCCESS_RESULT: &str = "success";
pub const JOBS_LABEL: &str = "This image will be able to execute the following jobs :";
pub const TASKS_LABEL: &str = "And following sub tasks:";
pub const CRITICAL_ERROR_MESSAGE: &str = "Critical error during build request";

/// Outcome reported by the build endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BuildResult {
    pub result: String,
    pub message: String,
    pub details: String,
    pub uuid: String,
    pub tags: Vec<String>,
    pub jobs: Vec<String>,
    pub tasks: Vec<String>,
}

impl BuildResult {
    pub fn is_success(&self) -> bool {
        self.result == SUCCESS_RESULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultIndicator {
    Success,
    Failure,
}

/// A labelled list of blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub label: String,
    pub items: Vec<String>,
}

impl Section {
    fn rebuild(label: &str, items: &[String]) -> Self {
        Self {
            label: label.to_string(),
            items: items.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPanel {
    pub message_lines: Vec<String>,
    pub details: String,
    pub image_visible: bool,
    pub jobs_visible: bool,
    pub indicator: Option<ResultIndicator>,
    pub uuid: String,
    pub tags: Vec<String>,
    pub jobs: Option<Section>,
    pub tasks: Option<Section>,
}

impl Default for ResultPanel {
    fn default() -> Self {
        Self {
            message_lines: Vec::new(),
            details: String::new(),
            image_visible: true,
            jobs_visible: true,
            indicator: None,
            uuid: String::new(),
            tags: Vec::new(),
            jobs: None,
            tasks: None,
        }
    }
}

impl ResultPanel {
    pub(crate) fn apply_response(&mut self, result: &BuildResult) {
        self.message_lines = message_lines(&result.message);
        self.details = result.details.clone();

        if !result.is_success() {
            self.hide_artifacts();
            return;
        }

        self.image_visible = true;
        self.jobs_visible = true;
        self.indicator = Some(ResultIndicator::Success);
        self.uuid = result.uuid.clone();
        self.tags = result.tags.clone();
        self.jobs = Some(Section::rebuild(JOBS_LABEL, &result.jobs));
        // An empty task list leaves the previous section in place.
        if !result.tasks.is_empty() {
            self.tasks = Some(Section::rebuild(TASKS_LABEL, &result.tasks));
        }
    }

    pub(crate) fn apply_transport_failure(&mut self) {
        self.hide_artifacts();
        self.message_lines = vec![CRITICAL_ERROR_MESSAGE.to_string()];
    }

    fn hide_artifacts(&mut self) {
        self.image_visible = false;
        self.jobs_visible = false;
        self.indicator = Some(ResultIndicator::Failure);
    }
}

fn message_lines(message: &str) -> Vec<String> {
    message.split('\n').map(ToOwned::to_owned).collect()
}
