//! Configuration management for Vinery.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main application configuration.
///
/// This is loaded from `~/.config/vinery/config.toml` (or platform
/// equivalent). If the file doesn't exist, default values are used. Runtime
/// inputs (credentials path, spreadsheet ID) may also be supplied by the
/// shell and override the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General application settings
    pub general: GeneralConfig,
    /// Browser session settings
    pub browser: BrowserConfig,
    /// Spreadsheet access settings
    pub sheets: SheetsConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Poll delay between reconciliation cycles, in seconds
    pub poll_delay_secs: f64,
    /// Directory where per-lead screenshots are written
    pub screenshots_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            poll_delay_secs: 60.0,
            screenshots_dir: PathBuf::from("screenshots"),
        }
    }
}

/// Browser session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run Chromium headless (default: visible window)
    pub headless: bool,
    /// Persistent profile directory; defaults to the app data dir
    pub profile_dir: Option<PathBuf>,
    /// Landing page opened for the one-time manual bootstrap
    pub portal_url: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            profile_dir: None,
            portal_url: "https://vine.amazon.com".to_string(),
        }
    }
}

/// Spreadsheet access settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetsConfig {
    /// Path to the service-account credentials JSON
    pub credentials_path: Option<PathBuf>,
    /// Spreadsheet identifier (the opaque key from the sheet URL)
    pub spreadsheet_id: Option<String>,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            tracing::debug!("Loading config from {}", config_path.display());
            let contents = fs::read_to_string(&config_path)?;
            let config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `VINERY_POLL_DELAY_SECS`: Override the poll delay
    /// - `VINERY_HEADLESS`: Override browser headless mode (true/false)
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;

        if let Ok(val) = std::env::var("VINERY_POLL_DELAY_SECS") {
            if let Ok(secs) = val.parse() {
                config.general.poll_delay_secs = secs;
                tracing::debug!("Override poll_delay_secs from env: {}", secs);
            }
        }

        if let Ok(val) = std::env::var("VINERY_HEADLESS") {
            if let Ok(headless) = val.parse() {
                config.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        Ok(config)
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/vinery/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "vinery", "vinery").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path.
    ///
    /// Uses XDG base directories: `~/.local/share/vinery`
    pub fn data_dir() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("com", "vinery", "vinery").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Resolve the browser profile directory.
    ///
    /// Explicit setting wins; otherwise a `chrome-profile` directory under
    /// the app data dir. The directory is owned exclusively by the worker
    /// for the loop's lifetime.
    pub fn profile_dir(&self) -> ConfigResult<PathBuf> {
        match &self.browser.profile_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::data_dir()?.join("chrome-profile")),
        }
    }
}
