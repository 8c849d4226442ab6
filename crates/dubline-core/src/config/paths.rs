//! Path utilities for dubline configuration files

use std::path::PathBuf;

/// Config file name inside [`default_config_dir`]
pub const CONFIG_FILE_NAME: &str = "engine.yaml";

/// Get the default configuration directory
///
/// Returns: `~/.config/dubline` (platform equivalent)
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dubline")
}

/// Get the default engine config file path
///
/// Returns: `~/.config/dubline/engine.yaml`
pub fn default_config_path() -> PathBuf {
    default_config_dir().join(CONFIG_FILE_NAME)
}
