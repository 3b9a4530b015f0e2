//! Configuration for command execution and output.
//!
//! Stored as JSON at `~/.portscope/config.json`. Every key is optional; a
//! missing file or key falls back to the defaults below.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{Error, Result};

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Time limit for each system command, in seconds.
    pub command_timeout_secs: u64,

    /// Upper bound on system commands running at the same time.
    pub max_concurrent_commands: usize,

    /// Run the per-PID commands that resolve names, users and full
    /// command lines. Disabling makes large listings much faster.
    pub resolve_command_lines: bool,

    /// Width the command line column is truncated to in tables.
    pub command_line_display_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command_timeout_secs: 5,
            max_concurrent_commands: 4,
            resolve_command_lines: true,
            command_line_display_width: 50,
        }
    }
}

/// Reads and writes the configuration file.
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a store for the default path, `~/.portscope/config.json`.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        Ok(Self {
            config_path: home.join(".portscope").join("config.json"),
        })
    }

    /// Create a store with a custom path (for testing).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from disk, or defaults if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to disk, creating the directory if needed.
    pub async fn save(&self, config: &Config) -> Result<()> {
        if let Some(dir) = self.config_path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).await.map_err(|e| {
                    Error::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(config)?;

        // Write to a temp file then rename so readers never see a partial file.
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        debug!(path = %self.config_path.display(), "Saved config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_store(dir: &tempfile::TempDir) -> ConfigStore {
        ConfigStore::with_path(dir.path().join("nested").join("config.json"))
    }

    #[tokio::test]
    async fn test_load_nonexistent() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);
        assert_eq!(store.load().await.unwrap(), Config::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = test_store(&dir);

        let config = Config {
            command_timeout_secs: 12,
            max_concurrent_commands: 2,
            resolve_command_lines: false,
            command_line_display_width: 80,
        };
        store.save(&config).await.unwrap();

        assert!(store.path().exists());
        assert!(!store.path().with_extension("json.tmp").exists());
        assert_eq!(store.load().await.unwrap(), config);
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "commandTimeoutSecs": 30 }"#).unwrap();

        let config = ConfigStore::with_path(path).load().await.unwrap();
        assert_eq!(config.command_timeout_secs, 30);
        assert_eq!(config.max_concurrent_commands, 4);
        assert!(config.resolve_command_lines);
        assert_eq!(config.command_line_display_width, 50);
    }

    #[tokio::test]
    async fn test_invalid_file_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let err = ConfigStore::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_camel_case_keys() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("\"commandTimeoutSecs\":5"));
        assert!(json.contains("\"maxConcurrentCommands\":4"));
        assert!(json.contains("\"resolveCommandLines\":true"));
        assert!(json.contains("\"commandLineDisplayWidth\":50"));
    }
}
