//! Persisted CLI configuration.
//!
//! Stored as JSON at `~/.config/qobuz-dl/config.json`:
//!
//! ```json
//! {
//!   "email": "me@example.com",
//!   "password": "...",
//!   "auth_token": "AbCdEf...",
//!   "download_folder": "downloads"
//! }
//! ```
//!
//! The auth token is written after the first successful login so later
//! invocations can skip the login call entirely. `download_folder` is
//! resolved relative to the working directory unless absolute.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Session token from a previous login, or supplied via `login --token`.
    #[serde(default)]
    pub auth_token: Option<String>,
    #[serde(default = "default_download_folder")]
    pub download_folder: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            auth_token: None,
            download_folder: default_download_folder(),
        }
    }
}

fn default_download_folder() -> PathBuf {
    PathBuf::from("downloads")
}

impl Config {
    /// Load the config, creating a default file if none exists yet.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }
        let data = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Save the config, creating parent directories if needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(&path, data).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Delete the config file from disk.
    pub fn clear() -> Result<()> {
        let path = Self::path()?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    fn path() -> Result<PathBuf> {
        let config = dirs::config_dir().context("cannot determine config directory")?;
        Ok(config.join("qobuz-dl").join("config.json"))
    }
}
