use crate::api::jira::{
    DEFAULT_FIELDS, DEFAULT_HOME_PROJECT, DEFAULT_MAX_RESULTS, DEFAULT_SERVICE_REQUEST_URL,
};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_JIRA_URL: &str = "https://jira.broadridge.net";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub jira: JiraConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    pub url: String,
    pub home_project: String,
    pub timeout_secs: u64,
    /// PEM bundle trusted in addition to the system roots.
    pub ca_cert: Option<PathBuf>,
    pub fields: String,
    pub max_results: u32,
    pub service_request_url: String,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_JIRA_URL.to_string(),
            home_project: DEFAULT_HOME_PROJECT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            ca_cert: None,
            fields: DEFAULT_FIELDS.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            service_request_url: DEFAULT_SERVICE_REQUEST_URL.to_string(),
        }
    }
}

impl Settings {
    /// Settings from `~/.ticketlens/config.toml`, or the defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let settings: Settings = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(settings)
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".ticketlens"))
    }
}
