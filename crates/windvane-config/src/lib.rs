//! Configuration for the windvane gateway.
//!
//! Layered figment stack: built-in defaults, then an optional TOML file,
//! then `WINDVANE_*` environment variables. Credentials are wrapped in
//! `SecretString` as soon as they leave figment and validated before any
//! client is constructed.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use windvane_api::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS, MAX_TIMEOUT_MS};
use windvane_api::{ClientConfig, Credentials};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("missing {field} (set WINDVANE_{env} or add it to the config file)")]
    Missing { field: String, env: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Raw settings as they appear in the TOML file / environment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Ecowitt application key (`WINDVANE_APPLICATION_KEY`).
    pub application_key: Option<String>,

    /// Ecowitt API key (`WINDVANE_API_KEY`).
    pub api_key: Option<String>,

    /// Upstream base URL (`WINDVANE_BASE_URL`).
    pub base_url: String,

    /// Per-request timeout in milliseconds (`WINDVANE_TIMEOUT_MS`).
    pub timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            application_key: None,
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_owned(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Default config file location: `~/.config/windvane/config.toml`
/// (platform equivalent via `directories`).
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "windvane", "windvane")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load settings from defaults, an optional TOML file, and the
/// environment. A missing file is fine; a malformed one is not.
pub fn load(config_file: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(Settings::default()));

    let file = config_file
        .map(Path::to_path_buf)
        .or_else(default_config_path);
    if let Some(path) = file {
        figment = figment.merge(Toml::file(path));
    }

    let settings = figment
        .merge(Env::prefixed("WINDVANE_"))
        .extract::<Settings>()?;
    Ok(settings)
}

impl Settings {
    /// Validate and translate into a [`ClientConfig`].
    ///
    /// Fails on missing credentials, an unparseable base URL, or a
    /// timeout outside (0, 300 000] ms — before any client exists.
    pub fn into_client_config(self) -> Result<ClientConfig, ConfigError> {
        let application_key = non_empty(self.application_key).ok_or_else(|| {
            ConfigError::Missing {
                field: "application key".into(),
                env: "APPLICATION_KEY".into(),
            }
        })?;
        let api_key = non_empty(self.api_key).ok_or_else(|| ConfigError::Missing {
            field: "API key".into(),
            env: "API_KEY".into(),
        })?;

        let base_url = Url::parse(&self.base_url).map_err(|e| ConfigError::Validation {
            field: "base_url".into(),
            reason: e.to_string(),
        })?;

        if self.timeout_ms == 0 || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Validation {
                field: "timeout_ms".into(),
                reason: format!("must be between 1 and {MAX_TIMEOUT_MS}, got {}", self.timeout_ms),
            });
        }

        Ok(ClientConfig::new(Credentials {
            application_key: SecretString::from(application_key),
            api_key: SecretString::from(api_key),
        })
        .with_base_url(base_url)
        .with_timeout(Duration::from_millis(self.timeout_ms)))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
