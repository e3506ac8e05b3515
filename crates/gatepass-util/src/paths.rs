//! Default paths for gatepass components
//!
//! Paths are user-writable by default:
//! - Config: `$XDG_CONFIG_HOME/gatepass/config.toml` or `~/.config/gatepass/config.toml`
//! - Data: `$XDG_DATA_HOME/gatepass` or `~/.local/share/gatepass`

use std::path::PathBuf;

/// Environment variable for overriding the config file path
pub const GATEPASS_CONFIG_ENV: &str = "GATEPASS_CONFIG";

/// Environment variable for overriding the data directory
pub const GATEPASS_DATA_DIR_ENV: &str = "GATEPASS_DATA_DIR";

/// Config filename within the config directory
const CONFIG_FILENAME: &str = "config.toml";

/// SQLite database filename within the data directory
pub const DATABASE_FILENAME: &str = "gatepass.db";

/// Application subdirectory name
const APP_DIR: &str = "gatepass";

/// Get the default config file path.
///
/// Order of precedence:
/// 1. `$GATEPASS_CONFIG` environment variable (if set)
/// 2. `$XDG_CONFIG_HOME/gatepass/config.toml` (if XDG_CONFIG_HOME is set)
/// 3. `~/.config/gatepass/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(GATEPASS_CONFIG_ENV) {
        return PathBuf::from(path);
    }

    config_path_without_env()
}

/// Get the config path without checking the GATEPASS_CONFIG env var.
pub fn config_path_without_env() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home).join(APP_DIR).join(CONFIG_FILENAME);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(APP_DIR)
            .join(CONFIG_FILENAME);
    }

    PathBuf::from("/etc").join(APP_DIR).join(CONFIG_FILENAME)
}

/// Get the default data directory.
///
/// Order of precedence:
/// 1. `$GATEPASS_DATA_DIR` environment variable (if set)
/// 2. `$XDG_DATA_HOME/gatepass` (if XDG_DATA_HOME is set)
/// 3. `~/.local/share/gatepass` (fallback)
pub fn default_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var(GATEPASS_DATA_DIR_ENV) {
        return PathBuf::from(path);
    }

    data_dir_without_env()
}

/// Get the data directory without checking the GATEPASS_DATA_DIR env var.
/// Used for default values in configs where the env var is checked separately.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    // Last resort
    PathBuf::from("/tmp").join(APP_DIR).join("data")
}
