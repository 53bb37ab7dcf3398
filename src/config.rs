//! Configuration Management
//!
//! Handles persistent configuration storage for podio-tasks.

use crate::podio::DEFAULT_API_URL;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable overriding the API endpoint
pub const ENV_API_URL: &str = "PODIO_API_URL";

/// Environment variable holding the access token
pub const ENV_ACCESS_TOKEN: &str = "PODIO_ACCESS_TOKEN";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// API endpoint
    #[serde(default)]
    pub api_url: Option<String>,
    /// OAuth access token obtained elsewhere
    #[serde(default)]
    pub access_token: Option<String>,
    /// Send every write with `silent=1`
    #[serde(default)]
    pub silent: bool,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("podio-tasks").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load from a specific file; a missing or unreadable file yields defaults
    pub fn load_from(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective API URL (CLI > env > config > default)
    pub fn effective_api_url(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| std::env::var(ENV_API_URL).ok().filter(|v| !v.is_empty()))
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Get effective access token (CLI > env > config)
    pub fn effective_token(&self, cli: Option<&str>) -> Option<String> {
        cli.map(str::to_string)
            .or_else(|| std::env::var(ENV_ACCESS_TOKEN).ok().filter(|v| !v.is_empty()))
            .or_else(|| self.access_token.clone())
    }

    /// Set API URL and save
    pub fn set_api_url(&mut self, api_url: &str) -> Result<()> {
        self.api_url = Some(api_url.to_string());
        self.save()
    }

    /// Set access token and save
    pub fn set_access_token(&mut self, token: &str) -> Result<()> {
        self.access_token = Some(token.to_string());
        self.save()
    }
}
