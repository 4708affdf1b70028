use crate::config::settings::Settings;
use crate::errors::{Result, TrackerError};
use anyhow::Context;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

pub const USERNAME_VAR: &str = "JIRA_USERNAME";
pub const PASSWORD_VAR: &str = "JIRA_PASSWORD";
pub const CREDENTIALS_FILE: &str = "credentials.toml";

#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `JIRA_USERNAME`/`JIRA_PASSWORD`, falling back to `~/.ticketlens/credentials.toml`.
    pub fn resolve() -> Result<Self> {
        let lookup = |name: &str| std::env::var(name).ok();
        if let Some(credentials) = Self::from_env(lookup) {
            return Ok(credentials);
        }

        let dir = Settings::config_dir().map_err(|e| {
            TrackerError::Configuration(format!("Could not load credentials: {:#}", e))
        })?;
        Self::resolve_with(lookup, &dir.join(CREDENTIALS_FILE))
    }

    pub fn resolve_with<F>(lookup: F, fallback: &Path) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(credentials) = Self::from_env(lookup) {
            return Ok(credentials);
        }

        tracing::debug!("Env vars {} or {} are undefined", USERNAME_VAR, PASSWORD_VAR);
        Self::from_file(fallback).map_err(|e| {
            TrackerError::Configuration(format!("Could not load credentials: {:#}", e))
        })
    }

    fn from_env<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let username = lookup(USERNAME_VAR).filter(|v| !v.is_empty())?;
        let password = lookup(PASSWORD_VAR).filter(|v| !v.is_empty())?;
        Some(Self { username, password })
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let credentials: Credentials = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        if credentials.username.is_empty() || credentials.password.is_empty() {
            anyhow::bail!("{} has an empty username or password", path.display());
        }

        Ok(credentials)
    }
}
