//! Configuration management
//!
//! Handles loading, saving, and managing configuration files, plus the
//! one-shot environment switches read at startup.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable forcing the primary window to start minimized.
pub const ENV_START_MINIMIZED: &str = "TEMPO_START_MINIMIZED";

/// Environment variable forcing re-acquisition of the devtools bundle.
pub const ENV_UPGRADE_DEVTOOLS: &str = "TEMPO_UPGRADE_DEVTOOLS";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config directory not found")]
    NoConfigDir,
}

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Primary window settings
    pub window: WindowConfig,
    /// Update feed settings
    pub update: UpdateConfig,
    /// Development tooling settings
    pub devtools: DevtoolsConfig,
}

/// Primary window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Inner width in logical pixels
    pub width: u32,
    /// Inner height in logical pixels
    pub height: u32,
    /// Start the primary window minimized
    pub start_minimized: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 728,
            start_minimized: false,
        }
    }
}

/// Update feed settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// GitHub repository serving releases, in "owner/repo" format
    pub repo: String,
    /// Request timeout for the version check and download, in seconds
    pub timeout_secs: u64,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            repo: "tempo-app/tempo".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Development tooling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevtoolsConfig {
    /// URL of the devtools bundle archive; empty disables acquisition
    pub bundle_url: String,
    /// Re-download the bundle even when it is already cached
    pub force_download: bool,
}

impl Default for DevtoolsConfig {
    fn default() -> Self {
        Self {
            bundle_url: String::new(),
            force_download: false,
        }
    }
}

impl Config {
    /// Apply the environment switches. Read once at startup; later changes
    /// to the environment have no effect.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(|name| std::env::var(name).ok());
    }

    fn apply_env_overrides_from(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(value) = var(ENV_START_MINIMIZED) {
            self.window.start_minimized = truthy(&value);
        }
        if let Some(value) = var(ENV_UPGRADE_DEVTOOLS) {
            self.devtools.force_download = truthy(&value);
        }
    }
}

fn truthy(value: &str) -> bool {
    !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
}

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("com", "tempo", "tempo").map(|p| p.config_dir().to_path_buf())
}

/// Get the config file path
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join("config.toml"))
}

/// Load configuration from file
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Save configuration to file
pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    let dir = config_dir().ok_or(ConfigError::NoConfigDir)?;
    std::fs::create_dir_all(&dir)?;

    let path = dir.join("config.toml");
    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, &content)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 728);
        assert!(!config.window.start_minimized);
        assert_eq!(config.update.timeout_secs, 30);
        assert!(config.devtools.bundle_url.is_empty());
    }

    #[test]
    fn test_truthy() {
        assert!(truthy("1"));
        assert!(truthy("true"));
        assert!(truthy("yes"));
        assert!(!truthy(""));
        assert!(!truthy("0"));
        assert!(!truthy("false"));
        assert!(!truthy("FALSE"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides_from(|name| match name {
            ENV_START_MINIMIZED => Some("1".to_string()),
            ENV_UPGRADE_DEVTOOLS => Some("true".to_string()),
            _ => None,
        });
        assert!(config.window.start_minimized);
        assert!(config.devtools.force_download);
    }

    #[test]
    fn test_env_overrides_absent_keep_config() {
        let mut config = Config::default();
        config.window.start_minimized = true;
        config.apply_env_overrides_from(|_| None);
        assert!(config.window.start_minimized);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [window]
            start_minimized = true

            [update]
            repo = "example/app"
            "#,
        )
        .unwrap();
        assert!(config.window.start_minimized);
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.update.repo, "example/app");
        assert_eq!(config.update.timeout_secs, 30);
    }
}
