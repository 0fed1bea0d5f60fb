//! Application configuration.
//!
//! Settings come from three sources, later ones overriding earlier:
//! an optional YAML config file, environment variables using the
//! double-underscore path scheme (`REPO__DIRECTORY`,
//! `ALLOWEDMETHODS__POST`, `RETENTION__MAXVERSIONS`, ...), and CLI flags
//! applied by `main`. Everything is validated once up front so the server
//! refuses to start on a bad configuration instead of failing mid-request.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{RepoError, Result};
use crate::retention::RetentionConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub repo: RepoSettings,
    pub listen: ListenSettings,
    pub allowed_methods: AllowedMethods,
    pub retention: RetentionSettings,
}

/// Storage settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoSettings {
    /// Root directory for the BOM store. Required.
    pub directory: Option<PathBuf>,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Per-method gates. GET is on by default; mutating methods are opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowedMethods {
    pub get: bool,
    pub post: bool,
    pub delete: bool,
}

impl Default for AllowedMethods {
    fn default() -> Self {
        Self {
            get: true,
            post: false,
            delete: false,
        }
    }
}

impl AllowedMethods {
    /// Value for the `Allow` response header: the enabled methods.
    #[must_use]
    pub fn allow_header(&self) -> String {
        let mut methods = Vec::new();
        if self.get {
            methods.push("GET");
        }
        if self.post {
            methods.push("POST");
        }
        if self.delete {
            methods.push("DELETE");
        }
        methods.join(", ")
    }
}

/// Retention policy settings as configured (validated, then converted to
/// [`RetentionConfig`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionSettings {
    pub max_versions: Option<u32>,
    pub max_age_days: Option<u32>,
    pub sweep_interval_secs: u64,
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            max_versions: None,
            max_age_days: None,
            sweep_interval_secs: 3600,
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the optional YAML file, then
    /// process environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    RepoError::config(format!("cannot read {}: {e}", path.display()))
                })?;
                serde_yaml::from_str(&text).map_err(|e| {
                    RepoError::config(format!("cannot parse {}: {e}", path.display()))
                })?
            }
            None => Self::default(),
        };
        config.apply_env(std::env::vars())?;
        Ok(config)
    }

    /// Apply environment overrides from an explicit iterator (testable
    /// without touching the process environment).
    pub fn apply_env(&mut self, vars: impl Iterator<Item = (String, String)>) -> Result<()> {
        for (key, value) in vars {
            match key.as_str() {
                "REPO__DIRECTORY" => self.repo.directory = Some(PathBuf::from(value)),
                "LISTEN__HOST" => self.listen.host = value,
                "LISTEN__PORT" => {
                    self.listen.port = parse_env(&key, &value)?;
                }
                "ALLOWEDMETHODS__GET" => self.allowed_methods.get = parse_env_bool(&key, &value)?,
                "ALLOWEDMETHODS__POST" => {
                    self.allowed_methods.post = parse_env_bool(&key, &value)?;
                }
                "ALLOWEDMETHODS__DELETE" => {
                    self.allowed_methods.delete = parse_env_bool(&key, &value)?;
                }
                "RETENTION__MAXVERSIONS" => {
                    self.retention.max_versions = Some(parse_env(&key, &value)?);
                }
                "RETENTION__MAXAGEDAYS" => {
                    self.retention.max_age_days = Some(parse_env(&key, &value)?);
                }
                "RETENTION__SWEEPINTERVALSECS" => {
                    self.retention.sweep_interval_secs = parse_env(&key, &value)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Check invariants the rest of the system relies on.
    pub fn validate(&self) -> Result<()> {
        if self.repo.directory.as_ref().map_or(true, |d| d.as_os_str().is_empty()) {
            return Err(RepoError::config(
                "repository directory is required (REPO__DIRECTORY or --directory)",
            ));
        }
        if let Some(0) = self.retention.max_versions {
            return Err(RepoError::config("RETENTION__MAXVERSIONS must be >= 1"));
        }
        if let Some(0) = self.retention.max_age_days {
            return Err(RepoError::config("RETENTION__MAXAGEDAYS must be >= 1"));
        }
        if self.retention.sweep_interval_secs == 0 {
            return Err(RepoError::config("RETENTION__SWEEPINTERVALSECS must be >= 1"));
        }
        Ok(())
    }

    /// The validated store root.
    pub fn directory(&self) -> Result<&Path> {
        self.repo
            .directory
            .as_deref()
            .ok_or_else(|| RepoError::config("repository directory is required"))
    }

    /// Socket address to bind.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.listen.host, self.listen.port)
            .parse()
            .map_err(|e| {
                RepoError::config(format!(
                    "invalid listen address {}:{}: {e}",
                    self.listen.host, self.listen.port
                ))
            })
    }

    /// Retention policy in sweeper terms.
    #[must_use]
    pub fn retention_config(&self) -> RetentionConfig {
        RetentionConfig {
            max_versions: self.retention.max_versions,
            max_age_days: self.retention.max_age_days,
            sweep_interval: Duration::from_secs(self.retention.sweep_interval_secs),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| RepoError::config(format!("invalid {key}={value:?}: {e}")))
}

fn parse_env_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(RepoError::config(format!(
            "invalid {key}={value:?}: expected a boolean"
        ))),
    }
}
