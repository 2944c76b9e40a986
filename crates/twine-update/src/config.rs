//! Update configuration with layered precedence
//!
//! Loaded from the following sources (low to high):
//! 1. Built-in defaults
//! 2. `~/.twine/update.yaml`
//! 3. Environment variables (`TWINE_*` prefix, plus `GITHUB_TOKEN`)

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("{var} must be a valid number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

/// Release registry settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct UpdateConfig {
    /// GitHub API base URL
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Repository owner
    #[serde(default = "default_repo_owner")]
    pub repo_owner: String,

    /// Repository name
    #[serde(default = "default_repo_name")]
    pub repo_name: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// API token, sent as a bearer token on metadata requests
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            repo_owner: default_repo_owner(),
            repo_name: default_repo_name(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            token: None,
        }
    }
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}
fn default_repo_owner() -> String {
    "twine-sh".to_string()
}
fn default_repo_name() -> String {
    crate::TOOL_NAME.to_string()
}
fn default_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    format!(
        "{}/{} ({}; {})",
        crate::TOOL_NAME,
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

impl UpdateConfig {
    /// Load configuration from the standard location and environment
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default().apply_env_overrides(),
        }
    }

    /// Load configuration from a specific file, then apply environment overrides.
    /// A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Self::default()
        };

        config.apply_env_overrides()
    }

    /// `~/.twine/update.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".twine").join("update.yaml"))
    }

    /// Request timeout as a [`Duration`]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(val) = env::var("TWINE_GITHUB_API_URL") {
            self.api_url = val;
        }

        if let Ok(val) = env::var("TWINE_GITHUB_REPO_OWNER") {
            self.repo_owner = val;
        }

        if let Ok(val) = env::var("TWINE_GITHUB_REPO_NAME") {
            self.repo_name = val;
        }

        if let Ok(val) = env::var("TWINE_HTTP_TIMEOUT_SECS") {
            self.timeout_secs = val.parse().map_err(|_| ConfigError::InvalidNumber {
                var: "TWINE_HTTP_TIMEOUT_SECS",
                value: val.clone(),
            })?;
        }

        if let Ok(val) = env::var("TWINE_GITHUB_TOKEN").or_else(|_| env::var("GITHUB_TOKEN")) {
            if !val.is_empty() {
                self.token = Some(val);
            }
        }

        Ok(self)
    }
}
