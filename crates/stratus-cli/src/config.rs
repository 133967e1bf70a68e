//! Configuration loading and types

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{WrapErr, eyre};
use serde::{Deserialize, Serialize};
use stratus_client::{DEFAULT_ENDPOINT_TEMPLATE, Endpoints, Service};

/// Top-level configuration for the stratus CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project to operate on
    pub project_id: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    /// Bearer token for the APIs
    pub token: Option<String>,
    /// Endpoint template; `{service}` is replaced by the service name
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Per-service base URLs, keyed by service name
    #[serde(default)]
    pub endpoints: BTreeMap<String, String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub wait: WaitSettings,
}

/// Polling settings applied to every waiter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitSettings {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_max_backoff")]
    pub max_backoff_secs: u64,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    #[serde(default)]
    pub initial_delay_secs: u64,
    /// Retry gateway errors (502/503/504) a few times before giving up
    #[serde(default)]
    pub retry_gateway_errors: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: None,
            region: default_region(),
            token: None,
            endpoint: default_endpoint(),
            endpoints: BTreeMap::new(),
            request_timeout_secs: default_request_timeout(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            wait: WaitSettings::default(),
        }
    }
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            max_backoff_secs: default_max_backoff(),
            backoff_factor: default_backoff_factor(),
            initial_delay_secs: 0,
            retry_gateway_errors: false,
        }
    }
}

fn default_region() -> String {
    "eu01".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT_TEMPLATE.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_poll_interval() -> u64 {
    5
}

fn default_max_backoff() -> u64 {
    30
}

fn default_backoff_factor() -> f64 {
    1.0
}

impl Config {
    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns error if the text is not valid configuration
    pub fn parse(content: &str) -> eyre::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content)
            .wrap_err_with(|| format!("invalid configuration in {}", path.display()))
    }

    /// Load from the first default path that exists
    ///
    /// Returns the path the configuration came from, or `None` when no file
    /// was found and defaults are used.
    ///
    /// # Errors
    /// Returns error if a found file cannot be read or parsed
    pub fn load_default() -> eyre::Result<(Self, Option<PathBuf>)> {
        let paths = [
            Some(PathBuf::from("stratus.toml")),
            dirs::config_dir().map(|p| p.join("stratus").join("config.toml")),
        ];

        for path in paths.into_iter().flatten() {
            if path.exists() {
                return Ok((Self::load(&path)?, Some(path)));
            }
        }

        Ok((Config::default(), None))
    }

    /// Endpoint routing with the per-service overrides applied
    ///
    /// # Errors
    /// Returns error for an invalid URL or an unknown service name
    pub fn endpoints(&self) -> eyre::Result<Endpoints> {
        let mut endpoints = Endpoints::new(self.endpoint.as_str())
            .wrap_err_with(|| format!("invalid endpoint template `{}`", self.endpoint))?;
        for (name, url) in &self.endpoints {
            let service = Service::from_name(name)
                .ok_or_else(|| eyre!("unknown service `{name}` in [endpoints]"))?;
            endpoints = endpoints
                .with_override(service, url)
                .wrap_err_with(|| format!("invalid endpoint for {name}"))?;
        }
        Ok(endpoints)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
