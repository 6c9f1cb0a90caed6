//! Client configuration.
//!
//! [`ClientConfig`] is read from a TOML file (see [`ClientConfig::default_config_path`])
//! and then overridden by command-line flags. Every field has a default, so a
//! missing file is not an error.

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the REST API; the `tasks` resource lives directly under it.
    pub base_url: String,
    /// How long a notification stays on screen.
    pub toast_millis: u64,
    /// Per-request timeout. `None` leaves the network default in place.
    pub request_timeout_secs: Option<u64>,
    /// Directory for the TUI log file. Defaults to the platform data dir.
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            toast_millis: 3000,
            request_timeout_secs: None,
            log_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ClientError::Config(e.to_string()))
    }

    /// Like [`ClientConfig::from_file`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Returns the default config file path: `~/.config/kanban-client/config.toml`.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kanban-client")
            .join("config.toml")
    }

    /// Directory the TUI writes its log file into.
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("kanban-client")
        })
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_millis)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// `base_url` with any trailing slash removed, ready for path joins.
    pub fn api_root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn validate(&self) -> Result<()> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(ClientError::Config("base_url must not be empty".into()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base_url must start with http:// or https://, got {base}"
            )));
        }
        if self.toast_millis == 0 {
            return Err(ClientError::Config(
                "toast_millis must be greater than 0".into(),
            ));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ClientError::Config(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
