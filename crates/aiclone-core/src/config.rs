//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes an optional storage directory override and the last email
//! used to sign in.
//!
//! Configuration is stored at `~/.config/aiclone/config.json`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "aiclone";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the storage directory
pub const STORAGE_DIR_ENV: &str = "AICLONE_STORAGE_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub storage_dir: Option<PathBuf>,
    #[serde(default)]
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from the default location, falling back to defaults on any error.
    /// The error is handed back rather than logged, since callers usually
    /// load config before a tracing subscriber exists.
    pub fn load_or_default() -> (Self, Option<anyhow::Error>) {
        match Self::load() {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Like [`Config::load_or_default`] for an explicit path.
    pub fn load_from_or_default(path: &Path) -> (Self, Option<anyhow::Error>) {
        match Self::load_from(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
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

    /// Where the session record lives: env override, then config, then the
    /// platform data directory.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(STORAGE_DIR_ENV).filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        self.configured_storage_dir()
    }

    fn configured_storage_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.storage_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aiclone").join("config.json");
        let config = Config {
            storage_dir: Some(PathBuf::from("/tmp/aiclone")),
            last_email: Some("a@b.com".to_string()),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_tolerates_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"last_email":"a@b.com"}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.last_email.as_deref(), Some("a@b.com"));
        assert_eq!(config.storage_dir, None);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "nope").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_load_or_default_returns_error_for_caller_to_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "nope").unwrap();

        let (config, err) = Config::load_from_or_default(&path);
        assert_eq!(config, Config::default());
        let err = err.unwrap();
        assert!(err.to_string().contains("Failed to parse config file"));

        let (_, err) = Config::load_from_or_default(&dir.path().join("missing.json"));
        assert!(err.is_none());
    }

    #[test]
    fn test_configured_storage_dir_override() {
        let config = Config {
            storage_dir: Some(PathBuf::from("/srv/aiclone")),
            last_email: None,
        };
        assert_eq!(
            config.configured_storage_dir().unwrap(),
            PathBuf::from("/srv/aiclone")
        );
    }
}
