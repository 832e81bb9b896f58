//! Configuration loading for Quill.
//!
//! Settings live in `~/.quill/config.toml`. Every section is optional; a missing file
//! yields defaults.
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:8000"
//! timeout_secs = 120
//!
//! [session]
//! path = "~/.quill/session.json"
//! clear_on_unauthorized = true
//!
//! [export]
//! download_dir = "${HOME}/Downloads"
//! ```
//!
//! String values support `${ENV_VAR}` expansion. `QUILL_API_URL` overrides `api.base_url`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const BASE_URL_ENV: &str = "QUILL_API_URL";

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct QuillConfig {
    pub api: Option<ApiConfig>,
    pub session: Option<SessionConfig>,
    pub export: Option<ExportConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid API base URL `{value}`: {source}")]
    BaseUrl {
        value: String,
        source: url::ParseError,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    /// Whole-request timeout. Advanced generations can take well over a minute.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    pub path: Option<String>,
    /// Drop the stored credential when the service rejects it.
    #[serde(default = "default_true")]
    pub clear_on_unauthorized: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: None,
            clear_on_unauthorized: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportConfig {
    pub download_dir: Option<String>,
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let var = &after[..end];
                if !var.is_empty() {
                    out.push_str(&env::var(var).unwrap_or_default());
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Expand `${VAR}` references and a leading `~/`.
fn expand_path(raw: &str) -> PathBuf {
    let expanded = expand_env_vars(raw);
    if let Some(rest) = expanded.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(expanded)
}

impl QuillConfig {
    /// Load from the default location. `Ok(None)` when there is no config file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path).map(Some),
            _ => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {}: {source}", path.display());
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Self::parse(&content).map_err(|source| {
            tracing::warn!("Failed to parse config at {}: {source}", path.display());
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Service root, from `QUILL_API_URL`, then `api.base_url`, then the default.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = env::var(BASE_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| {
                self.api
                    .as_ref()
                    .and_then(|api| api.base_url.as_deref())
                    .map(expand_env_vars)
            })
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        parse_base_url(&raw)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .api
            .as_ref()
            .and_then(|api| api.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    /// Where the durable session store keeps the credential.
    #[must_use]
    pub fn session_path(&self) -> Option<PathBuf> {
        self.session
            .as_ref()
            .and_then(|session| session.path.as_deref())
            .map(expand_path)
            .or_else(default_session_path)
    }

    #[must_use]
    pub fn clear_session_on_unauthorized(&self) -> bool {
        self.session
            .as_ref()
            .is_none_or(|session| session.clear_on_unauthorized)
    }

    #[must_use]
    pub fn download_dir(&self) -> PathBuf {
        self.export
            .as_ref()
            .and_then(|export| export.download_dir.as_deref())
            .map_or_else(|| PathBuf::from("."), expand_path)
    }
}

/// Parse a service root, normalizing it to end with `/` so relative joins keep any path prefix.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&normalized).map_err(|source| ConfigError::BaseUrl {
        value: trimmed.to_string(),
        source,
    })
}

#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".quill"))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

#[must_use]
pub fn default_session_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("session.json"))
}
