//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Visitor API connection
    #[serde(default)]
    pub api: RawApiConfig,

    /// Console-level settings
    #[serde(default)]
    pub console: RawConsoleConfig,

    /// Pass listing settings
    #[serde(default)]
    pub listing: RawListingConfig,

    /// Dashboard settings
    #[serde(default)]
    pub dashboard: RawDashboardConfig,
}

/// Visitor API connection settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawApiConfig {
    /// Base URL of the visitor API (e.g. "http://localhost:5000")
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_seconds: Option<u64>,
}

/// Console-level settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawConsoleConfig {
    /// Directory for the roster cache and audit log
    pub data_dir: Option<PathBuf>,
}

/// Listing settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawListingConfig {
    /// Rows shown per page
    pub rows_per_page: Option<usize>,
}

/// Dashboard settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawDashboardConfig {
    /// Number of recent passes shown
    pub recent_count: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_api_section() {
        let toml_str = r#"
            config_version = 1

            [api]
            base_url = "http://localhost:5000"
        "#;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url.as_deref(), Some("http://localhost:5000"));
        assert!(config.api.timeout_seconds.is_none());
        assert!(config.listing.rows_per_page.is_none());
    }

    #[test]
    fn unknown_sections_are_ignored() {
        let toml_str = r##"
            config_version = 1

            [theme]
            accent = "#facc15"
        "##;

        let config: RawConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.config_version, 1);
    }
}
