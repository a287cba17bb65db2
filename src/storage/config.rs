use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::listener::DEFAULT_MAX_PAYLOAD_BYTES;
use crate::models::NotificationType;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Listener behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Which callbacks to register: change-notification-only, changed-with-data or all
    #[serde(default)]
    pub notification_type: NotificationType,

    /// Hash images to suppress repeats (costs CPU proportional to image size)
    #[serde(default)]
    pub verify_new_image_data: bool,

    /// Payloads larger than this are dropped
    #[serde(default = "default_max_payload_bytes")]
    pub max_payload_bytes: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            notification_type: NotificationType::default(),
            verify_new_image_data: false,
            max_payload_bytes: default_max_payload_bytes(),
        }
    }
}

/// Native poll loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        PollingConfig {
            interval_ms: default_interval_ms(),
        }
    }
}

/// Log levels for the file and console sinks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_file_level")]
    pub file_level: String,
    #[serde(default = "default_console_level")]
    pub console_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            file_level: default_file_level(),
            console_level: default_console_level(),
        }
    }
}

// Default value functions for serde
fn default_max_payload_bytes() -> usize {
    DEFAULT_MAX_PAYLOAD_BYTES
}

fn default_interval_ms() -> u64 {
    100
}

fn default_file_level() -> String {
    "info".to_string()
}

fn default_console_level() -> String {
    "warn".to_string()
}

/// Trait for configuration storage
pub trait ConfigStorage: Send + Sync {
    /// Load configuration from file
    fn load(&self) -> Result<Config>;

    /// Save configuration to file
    fn save(&self, config: &Config) -> Result<()>;

    /// Get the config file path
    fn path(&self) -> &PathBuf;

    /// Create default configuration file if it doesn't exist
    fn create_default(&self) -> Result<()>;
}

/// TOML-based implementation of ConfigStorage
pub struct TomlConfigStorage {
    path: PathBuf,
}

impl TomlConfigStorage {
    /// Create a new TomlConfigStorage with the given path
    pub fn new(path: PathBuf) -> Self {
        TomlConfigStorage { path }
    }
}

impl ConfigStorage for TomlConfigStorage {
    fn load(&self) -> Result<Config> {
        use anyhow::Context;
        use std::fs;

        // If file doesn't exist, create default and return it
        if !self.path.exists() {
            log::info!(
                "Config file not found at {:?}, creating default configuration",
                self.path
            );
            self.create_default()?;
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config from {:?}", self.path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", self.path))?;

        log::info!("Loaded configuration from {:?}", self.path);
        log::debug!(
            "Config: notification_type={:?}, verify_new_image_data={}, interval={}ms",
            config.general.notification_type,
            config.general.verify_new_image_data,
            config.polling.interval_ms
        );

        Ok(config)
    }

    fn save(&self, config: &Config) -> Result<()> {
        use anyhow::Context;
        use std::fs;

        let toml_str = toml::to_string_pretty(config)
            .with_context(|| "Failed to serialize configuration")?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        fs::write(&self.path, toml_str)
            .with_context(|| format!("Failed to write config to {:?}", self.path))?;

        log::debug!("Saved configuration to {:?}", self.path);

        Ok(())
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn create_default(&self) -> Result<()> {
        use anyhow::Context;
        use std::fs;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        // Use the example config compiled into the binary
        let example_config = include_str!("../../clipmon.toml.example");

        fs::write(&self.path, example_config)
            .with_context(|| format!("Failed to create default config at {:?}", self.path))?;

        log::info!("Created default configuration at {:?}", self.path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.general.notification_type, NotificationType::ChangedWithData);
        assert!(!config.general.verify_new_image_data);
        assert_eq!(config.general.max_payload_bytes, 52_428_800);
        assert_eq!(config.polling.interval_ms, 100);
        assert_eq!(config.logging.file_level, "info");
        assert_eq!(config.logging.console_level, "warn");
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
        [general]
        notification_type = "all"
        verify_new_image_data = true
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.notification_type, NotificationType::All);
        assert!(config.general.verify_new_image_data);
        assert_eq!(config.polling.interval_ms, 100);
    }

    #[test]
    fn test_example_config_parses_to_defaults() {
        let config: Config = toml::from_str(include_str!("../../clipmon.toml.example")).unwrap();
        assert_eq!(config.general.notification_type, NotificationType::ChangedWithData);
        assert!(!config.general.verify_new_image_data);
        assert_eq!(config.polling.interval_ms, 100);
    }

    #[test]
    fn test_load_creates_default_and_save_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TomlConfigStorage::new(dir.path().join("conf/clipmon.toml"));

        let config = storage.load().unwrap();
        assert!(storage.path().exists());
        assert_eq!(config.polling.interval_ms, 100);

        let mut changed = config.clone();
        changed.general.notification_type = NotificationType::ChangeNotificationOnly;
        changed.polling.interval_ms = 500;
        storage.save(&changed).unwrap();

        let reloaded = storage.load().unwrap();
        assert_eq!(
            reloaded.general.notification_type,
            NotificationType::ChangeNotificationOnly
        );
        assert_eq!(reloaded.polling.interval_ms, 500);
    }

    #[test]
    fn test_unknown_notification_type_rejected() {
        let toml_str = r#"
        [general]
        notification_type = "sometimes"
        "#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }
}
