//! Application configuration management.
//!
//! The configuration names the backend to talk to and remembers the last
//! username. It is stored at `~/.config/vision-admin/config.json`; the
//! `VISION_API_URL` environment variable overrides the stored backend.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::auth::FileStorage;

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "vision-admin";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend used when nothing is configured
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Environment variable overriding the backend URL
pub const API_URL_ENV: &str = "VISION_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Backend origin plus `/api` prefix
    pub api_url: Option<String>,
    /// Origin serving uploaded images; defaults to the backend origin
    pub asset_base_url: Option<String>,
    pub last_username: Option<String>,
    /// Opt-in request timeout. Requests never time out by default.
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path).context("Failed to read config file")?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply overrides from the environment
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_url = Some(url);
            }
        }
    }

    /// Backend base URL without a trailing slash
    pub fn api_url(&self) -> String {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
            .to_string()
    }

    /// Where image paths returned by the backend are served from
    pub fn asset_base_url(&self) -> String {
        if let Some(base) = self.asset_base_url.as_deref().filter(|b| !b.trim().is_empty()) {
            return base.trim().trim_end_matches('/').to_string();
        }
        match Url::parse(&self.api_url()) {
            Ok(url) => url.origin().ascii_serialization(),
            Err(_) => self.api_url(),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Session storage directory. Sessions are kept per backend origin, so
    /// switching backends never sends one site's token to another.
    pub fn session_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir
            .join(APP_NAME)
            .join("sessions")
            .join(origin_slug(&self.api_url())))
    }

    pub fn session_storage(&self) -> Result<FileStorage> {
        Ok(FileStorage::new(self.session_dir()?))
    }
}

/// Filesystem-safe name for the origin of a URL, e.g. `localhost_5000`.
pub fn origin_slug(api_url: &str) -> String {
    let origin = match Url::parse(api_url) {
        Ok(url) => match (url.host_str(), url.port_or_known_default()) {
            (Some(host), Some(port)) => format!("{}_{}", host, port),
            (Some(host), None) => host.to_string(),
            _ => api_url.to_string(),
        },
        Err(_) => api_url.to_string(),
    };

    origin
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
