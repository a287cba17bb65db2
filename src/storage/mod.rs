pub mod config;

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

pub use config::{
    Config, ConfigStorage, GeneralConfig, LoggingConfig, PollingConfig, TomlConfigStorage,
};

/// Ensure XDG data and config directories exist
/// Returns (data_dir, config_dir)
///
/// XDG Base Directory Specification:
/// - Data: $XDG_DATA_HOME/clipmon (default: ~/.local/share/clipmon)
/// - Config: $XDG_CONFIG_HOME/clipmon (default: ~/.config/clipmon)
pub fn ensure_directories() -> Result<(PathBuf, PathBuf)> {
    let home = env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .context("HOME environment variable not set")?;
    let home_path = PathBuf::from(home);

    // Get XDG data directory
    let data_dir = match env::var("XDG_DATA_HOME") {
        Ok(xdg_data) => PathBuf::from(xdg_data).join("clipmon"),
        Err(_) => home_path.join(".local/share/clipmon"),
    };

    // Get XDG config directory
    let config_dir = match env::var("XDG_CONFIG_HOME") {
        Ok(xdg_config) => PathBuf::from(xdg_config).join("clipmon"),
        Err(_) => home_path.join(".config/clipmon"),
    };

    // Create directories if they don't exist
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;
    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

    log::debug!("Data directory: {:?}", data_dir);
    log::debug!("Config directory: {:?}", config_dir);

    Ok((data_dir, config_dir))
}
