//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\music-provider\config.toml
//! - macOS: ~/Library/Application Support/music-provider/config.toml
//! - Linux: ~/.config/music-provider/config.toml
//!
//! The password is never written here. It comes from the command line or
//! the `SUBSONIC_PASSWORD` environment variable.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which server to talk to, and as whom
    pub server: ServerConfig,

    /// Provider tuning
    pub provider: ProviderConfig,
}

/// Server connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL, e.g. "https://music.example.com"
    pub url: String,

    pub username: String,

    /// Send the password hex-encoded instead of a salted token.
    /// Needed for servers that authenticate against LDAP.
    pub legacy_auth: bool,

    /// Client name reported to the server (`c` parameter)
    pub client_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            legacy_auth: false,
            client_name: "music-provider".to_string(),
        }
    }
}

/// Provider behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// How long genre and playlist lists are reused
    pub cache_ttl_secs: u64,

    /// Concurrent requests per chunk for per-track mutations
    pub rating_batch_size: usize,

    /// Page size used by album and track iterators
    pub page_size: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 60,
            rating_batch_size: 5,
            page_size: 20,
        }
    }
}

impl ProviderConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

const FILE_NAME: &str = "config.toml";

/// `<os config dir>/music-provider`
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("music-provider"))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join(FILE_NAME))
}

/// Read the user's settings.
///
/// Never fails: anything wrong with the file is logged and the defaults
/// are used, so a broken config cannot keep the CLI from starting.
pub fn load() -> Config {
    match config_path() {
        Some(path) => load_from(&path),
        None => {
            tracing::warn!("No OS config directory; running with default settings");
            Config::default()
        }
    }
}

/// [`load`] for an explicit path.
pub fn load_from(path: &Path) -> Config {
    match read(path) {
        Ok(Some(config)) => {
            tracing::debug!(path = %path.display(), "Settings loaded");
            config
        }
        Ok(None) => {
            tracing::debug!(path = %path.display(), "No settings file yet");
            Config::default()
        }
        Err(e) => {
            tracing::warn!("{e}; running with default settings");
            Config::default()
        }
    }
}

fn read(path: &Path) -> Result<Option<Config>, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::Read(path.to_path_buf(), e)),
    };
    toml::from_str(&text)
        .map(Some)
        .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
}

/// Store `config` in the user's config directory and return where it went.
pub fn save(config: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)?;
    Ok(path)
}

/// Write `config` to `path`, creating parent directories.
///
/// The new contents land in a sibling file first and are renamed over
/// `path`, so readers never see a half-written file.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write(parent.to_path_buf(), e))?;
    }
    let text = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    let staging = path.with_extension("toml.new");
    std::fs::write(&staging, text).map_err(|e| ConfigError::Write(staging.clone(), e))?;
    std::fs::rename(&staging, path).map_err(|e| ConfigError::Write(path.to_path_buf(), e))?;

    tracing::info!(path = %path.display(), "Settings saved");
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("the OS reports no config directory for this user")]
    NoConfigDir,

    #[error("cannot read settings from {}: {}", .0.display(), .1)]
    Read(PathBuf, std::io::Error),

    #[error("settings in {} are not valid TOML: {}", .0.display(), .1)]
    Parse(PathBuf, toml::de::Error),

    #[error("cannot encode settings: {0}")]
    Serialize(toml::ser::Error),

    #[error("cannot write {}: {}", .0.display(), .1)]
    Write(PathBuf, std::io::Error),
}
