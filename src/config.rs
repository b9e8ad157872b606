use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::LogConfig;
use crate::models::Locale;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration metadata
    pub metadata: ConfigMetadata,

    /// General application settings
    pub settings: AppSettings,

    /// Logging settings
    #[serde(default)]
    pub logging: LogConfig,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Data directory path
    pub data_dir: PathBuf,

    /// Plan database path
    pub database_path: PathBuf,

    /// Drill catalog seed file (JSON)
    pub catalog_path: PathBuf,

    /// Default locale for drill text resolution
    pub locale: Locale,

    /// Directory exported documents are written to
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();
        let data_dir = default_data_dir();
        Self {
            metadata: ConfigMetadata {
                version: "1".to_string(),
                created_at: now,
                updated_at: now,
            },
            settings: AppSettings {
                database_path: data_dir.join("plans.db"),
                catalog_path: data_dir.join("catalog.json"),
                export_dir: data_dir.join("exports"),
                locale: Locale::En,
                data_dir,
            },
            logging: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Default config file location under the platform config dir
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flagplan")
            .join("config.toml")
    }

    /// Load configuration, falling back to defaults when the file is missing
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration, updating the modification timestamp
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        // Write-then-rename so a crash mid-save never corrupts the file
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, content)
            .with_context(|| format!("Failed to write config file: {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace config file: {}", path.display()))?;
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flagplan")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_share_data_dir() {
        let config = AppConfig::default();
        assert!(config
            .settings
            .database_path
            .starts_with(&config.settings.data_dir));
        assert!(config
            .settings
            .catalog_path
            .starts_with(&config.settings.data_dir));
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.settings.locale = Locale::Cs;
        config.save(&path).unwrap();

        let reloaded = AppConfig::load_or_default(&path).unwrap();
        assert_eq!(reloaded.settings.locale, Locale::Cs);
        assert!(reloaded.metadata.updated_at >= reloaded.metadata.created_at);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.settings.locale, Locale::En);
    }
}
