use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::installed::read_version_header;
use crate::release::channel::ChannelLevel;
use crate::release::checker::CheckRequest;
use crate::release::error::ConfigError;

// =============================================================================
// Time-related constants
// =============================================================================

/// Lifetime of a cached decision in milliseconds (10 hours)
///
/// Must stay below [`HOST_POLL_INTERVAL_MS`].
pub const CACHE_TTL_MS: i64 = 10 * 60 * 60 * 1000;

/// Typical host polling interval in milliseconds (12 hours)
pub const HOST_POLL_INTERVAL_MS: i64 = 12 * 60 * 60 * 1000;

/// Delay between starting each check to avoid rate limiting (10ms)
pub const FETCH_STAGGER_DELAY_MS: u64 = 10;

/// Top-level configuration file
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Base URL of the hosting provider's API
    pub api_base_url: Option<String>,
    pub cache: CacheConfig,
    pub components: Vec<ComponentConfig>,
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// A tracked component
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfig {
    pub slug: String,
    pub repository: String,
    #[serde(default)]
    pub channel: ChannelLevel,
    /// Installed version, if known up front
    #[serde(default)]
    pub installed_version: Option<String>,
    /// File carrying a `Version:` header, read when `installed_version` is unset
    #[serde(default)]
    pub version_file: Option<PathBuf>,
}

impl ComponentConfig {
    /// Resolve the installed version and build a check request
    pub fn to_request(&self) -> Result<Option<CheckRequest>, ConfigError> {
        let installed_version = match (&self.installed_version, &self.version_file) {
            (Some(version), _) => Some(version.clone()),
            (None, Some(path)) => read_version_header(path)?,
            (None, None) => None,
        };

        Ok(installed_version.map(|installed_version| CheckRequest {
            slug: self.slug.clone(),
            repository: self.repository.clone(),
            installed_version,
            minimum: self.channel,
        }))
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// Returns the path to the data directory for release-channel.
/// Uses $XDG_DATA_HOME/release-channel if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/release-channel,
/// or ./release-channel if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the database file.
pub fn db_path() -> PathBuf {
    data_dir().join("decisions.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("release-channel.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("release-channel")
}
