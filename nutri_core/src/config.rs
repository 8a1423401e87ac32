//! Configuration file support for NutriVision.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/nutrivision/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub share: ShareConfig,
}

/// Data storage location configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "crate::storage::default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: crate::storage::default_data_dir(),
        }
    }
}

/// Storage quota configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Maximum serialized size of the meal log; `None` disables the check
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            quota_bytes: default_quota_bytes(),
        }
    }
}

/// Share link configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShareConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

// Default value functions

fn default_quota_bytes() -> Option<u64> {
    // Matches the typical quota of the original storage medium
    Some(5 * 1024 * 1024)
}

fn default_base_url() -> String {
    "https://nutrivision.app/".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("nutrivision").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.quota_bytes, Some(5 * 1024 * 1024));
        assert!(config.share.base_url.starts_with("https://"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.storage.quota_bytes, parsed.storage.quota_bytes);
        assert_eq!(config.share.base_url, parsed.share.base_url);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[share]
base_url = "https://example.test/nutri"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.share.base_url, "https://example.test/nutri");
        assert_eq!(config.storage.quota_bytes, Some(5 * 1024 * 1024)); // default
    }
}
