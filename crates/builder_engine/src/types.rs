use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// One multipart field of a build submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, path: PathBuf },
}

/// Outgoing build request body, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormPayload {
    pub parts: Vec<FormPart>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn push_file(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.parts.push(FormPart::File {
            name: name.into(),
            path: path.into(),
        });
    }

    /// First text value stored under `name`.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|part| match part {
            FormPart::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }
}

/// JSON body answered by `POST /build`.
///
/// Error responses only carry `result`, `message` and `details`; the artifact
/// fields default to empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct BuildResponse {
    pub result: String,
    pub message: String,
    pub details: String,
    pub uuid: String,
    pub tags: Vec<String>,
    pub jobs: Vec<String>,
    pub tasks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    BuildCompleted {
        result: Result<BuildResponse, BuildError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct BuildError {
    pub kind: FailureKind,
    pub message: String,
}

impl BuildError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Payload,
    HttpStatus(u16),
    Timeout,
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Payload => write!(f, "unreadable payload"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Decode => write!(f, "undecodable response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
