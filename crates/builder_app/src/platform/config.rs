use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use builder_engine::{BuildSettings, ChannelError, ChannelSettings, BUILD_ENDPOINT};
use builder_logging::builder_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::logging::LogDestination;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILENAME: &str = "builder.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server: String,
    pub connect_timeout_secs: u64,
    /// No limit when absent; builds routinely take minutes.
    pub request_timeout_secs: Option<u64>,
    pub reconnect_delay_ms: u64,
    /// How long to wait for the realtime channel before submitting anyway.
    pub connect_wait_ms: u64,
    pub attach_session_id: bool,
    pub log_destination: LogDestination,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: "http://127.0.0.1:5001".to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: None,
            reconnect_delay_ms: 2000,
            connect_wait_ms: 3000,
            attach_session_id: true,
            log_destination: LogDestination::File,
        }
    }
}

impl ClientConfig {
    pub fn build_settings(&self) -> BuildSettings {
        BuildSettings {
            base_url: self.server.clone(),
            endpoint: BUILD_ENDPOINT.to_string(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn channel_settings(&self) -> Result<ChannelSettings, ChannelError> {
        let mut settings = ChannelSettings::for_server(&self.server)?;
        settings.reconnect_delay = Duration::from_millis(self.reconnect_delay_ms);
        Ok(settings)
    }
}

/// Loads `explicit` when given (it must exist), otherwise `builder.ron` in the
/// working directory if present, otherwise defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<ClientConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILENAME);
            if !fallback.exists() {
                return Ok(ClientConfig::default());
            }
            fallback
        }
    };

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    let config = ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.clone(),
        message: err.to_string(),
    })?;
    builder_info!("Loaded config from {:?}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"(server: "http://builder.internal:8080", attach_session_id: false)"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.server, "http://builder.internal:8080");
        assert!(!config.attach_session_id);
        assert_eq!(config.connect_wait_ms, ClientConfig::default().connect_wait_ms);
        assert_eq!(config.log_destination, LogDestination::File);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.ron"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_config_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(server: 42").unwrap();
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn settings_follow_server_address() {
        let config = ClientConfig {
            server: "http://10.0.0.5:5001".to_string(),
            request_timeout_secs: Some(600),
            reconnect_delay_ms: 250,
            ..ClientConfig::default()
        };
        let build = config.build_settings();
        assert_eq!(build.base_url, "http://10.0.0.5:5001");
        assert_eq!(build.request_timeout, Some(Duration::from_secs(600)));

        let channel = config.channel_settings().unwrap();
        assert_eq!(channel.url.host_str(), Some("10.0.0.5"));
        assert_eq!(channel.url.port(), Some(5001));
        assert_eq!(channel.reconnect_delay, Duration::from_millis(250));
    }
}
