//! Configuration.
//!
//! [`SpaConfig`] is read from a JSON file where every field is optional, then
//! adjusted by `SPAFLOW_*` environment variables.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the pipeline treats a trailing slash on the requested path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSlashPolicy {
    /// Leave URLs alone.
    #[default]
    Ignore,
    /// Redirect `/foo` to `/foo/`.
    Enforce,
    /// Redirect `/foo/` to `/foo`.
    Remove,
}

impl TrailingSlashPolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ignore" => Some(Self::Ignore),
            "enforce" => Some(Self::Enforce),
            "remove" => Some(Self::Remove),
            _ => None,
        }
    }
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `info,spaflow=debug`.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
        }
    }
}

/// Pipeline and transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaConfig {
    /// Report redirects and not-found responses as 200 so the frontend can
    /// read the body.
    #[serde(default = "default_true")]
    pub overwrite_status_codes: bool,
    /// Render diagnostic pages for failed requests.
    #[serde(default)]
    pub debug: bool,
    /// Trailing slash policy.
    #[serde(default)]
    pub trailing_slash: TrailingSlashPolicy,
    /// Lifetime of cached pages. `None` keeps pages until invalidated.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_seconds: Option<u64>,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_true() -> bool {
    true
}

#[allow(clippy::unnecessary_wraps)]
fn default_cache_ttl() -> Option<u64> {
    Some(300)
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for SpaConfig {
    fn default() -> Self {
        Self {
            overwrite_status_codes: true,
            debug: false,
            trailing_slash: TrailingSlashPolicy::default(),
            cache_ttl_seconds: default_cache_ttl(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SpaConfig {
    /// Parses a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON file and applies the process environment on top.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)?.with_env()
    }

    /// Applies `SPAFLOW_*` overrides from the process environment.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Applies `SPAFLOW_*` overrides read through `lookup`.
    pub fn with_env_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("SPAFLOW_DEBUG") {
            self.debug = parse_bool("SPAFLOW_DEBUG", &value)?;
        }
        if let Some(value) = lookup("SPAFLOW_OVERWRITE_STATUS_CODES") {
            self.overwrite_status_codes = parse_bool("SPAFLOW_OVERWRITE_STATUS_CODES", &value)?;
        }
        if let Some(value) = lookup("SPAFLOW_TRAILING_SLASH") {
            self.trailing_slash = TrailingSlashPolicy::parse(&value)
                .ok_or_else(|| invalid("SPAFLOW_TRAILING_SLASH", &value))?;
        }
        if let Some(value) = lookup("SPAFLOW_CACHE_TTL_SECONDS") {
            self.cache_ttl_seconds = match value.trim() {
                "" | "none" => None,
                ttl => Some(ttl.parse().map_err(|_| invalid("SPAFLOW_CACHE_TTL_SECONDS", &value))?),
            };
        }
        if let Some(value) = lookup("SPAFLOW_LOG") {
            self.logging.filter = value;
        }
        Ok(self)
    }

    /// Cache lifetime as a duration.
    #[must_use]
    pub fn cache_ttl(&self) -> Option<chrono::Duration> {
        self.cache_ttl_seconds
            .and_then(|secs| i64::try_from(secs).ok())
            .map(chrono::Duration::seconds)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
    }
}
