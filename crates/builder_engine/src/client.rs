use std::path::Path;
use std::time::Duration;

use builder_logging::{builder_debug, builder_info};
use reqwest::multipart::{Form, Part};

use crate::{BuildError, BuildResponse, FailureKind, FormPart, FormPayload};

pub const BUILD_ENDPOINT: &str = "/build";

#[derive(Debug, Clone)]
pub struct BuildSettings {
    pub base_url: String,
    pub endpoint: String,
    pub connect_timeout: Duration,
    /// Builds run for minutes; `None` waits for as long as the server takes.
    pub request_timeout: Option<Duration>,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5001".to_string(),
            endpoint: BUILD_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
        }
    }
}

#[async_trait::async_trait]
pub trait BuildClient: Send + Sync {
    async fn post_build(&self, payload: &FormPayload) -> Result<BuildResponse, BuildError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBuildClient {
    settings: BuildSettings,
}

impl ReqwestBuildClient {
    pub fn new(settings: BuildSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, BuildError> {
        let mut builder = reqwest::Client::builder().connect_timeout(self.settings.connect_timeout);
        if let Some(timeout) = self.settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|err| BuildError::new(FailureKind::Network, err.to_string()))
    }

    fn endpoint_url(&self) -> Result<reqwest::Url, BuildError> {
        reqwest::Url::parse(&self.settings.base_url)
            .and_then(|base| base.join(&self.settings.endpoint))
            .map_err(|err| BuildError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

#[async_trait::async_trait]
impl BuildClient for ReqwestBuildClient {
    async fn post_build(&self, payload: &FormPayload) -> Result<BuildResponse, BuildError> {
        let url = self.endpoint_url()?;
        let form = multipart_form(payload).await?;
        let client = self.build_client()?;

        builder_info!("POST {} with {} form parts", url, payload.parts.len());
        let response = client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BuildError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await.map_err(map_reqwest_error)?;
        builder_debug!("Build response received ({} bytes)", body.len());
        serde_json::from_slice(&body)
            .map_err(|err| BuildError::new(FailureKind::Decode, err.to_string()))
    }
}

async fn multipart_form(payload: &FormPayload) -> Result<Form, BuildError> {
    let mut form = Form::new();
    for part in &payload.parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
            FormPart::File { name, path } => form.part(name.clone(), file_part(path).await?),
        };
    }
    Ok(form)
}

async fn file_part(path: &Path) -> Result<Part, BuildError> {
    let bytes = tokio::fs::read(path).await.map_err(|err| {
        BuildError::new(FailureKind::Payload, format!("{}: {err}", path.display()))
    })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Part::bytes(bytes).file_name(file_name))
}

fn map_reqwest_error(err: reqwest::Error) -> BuildError {
    if err.is_timeout() {
        return BuildError::new(FailureKind::Timeout, err.to_string());
    }
    BuildError::new(FailureKind::Network, err.to_string())
}
