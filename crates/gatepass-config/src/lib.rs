//! Configuration parsing and validation for gatepass
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Visitor API endpoint and timeout
//! - Listing and dashboard sizing
//! - Validation with clear error messages

mod schema;
mod settings;
mod validation;

pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Settings> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let settings = parse_config(&content)?;
    tracing::debug!(path = %path.display(), "Configuration parsed");
    Ok(settings)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<Settings> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(Settings::from_raw(raw))
}

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_minimal_config() {
        let config = r#"
            config_version = 1
        "#;

        let settings = parse_config(config).unwrap();
        assert!(settings.api.base_url.is_none());
        assert_eq!(settings.listing.rows_per_page, DEFAULT_ROWS_PER_PAGE);
        assert_eq!(settings.dashboard.recent_count, DEFAULT_RECENT_COUNT);
    }

    #[test]
    fn parse_full_config() {
        let config = r#"
            config_version = 1

            [api]
            base_url = "https://visitors.campus.example/"
            timeout_seconds = 5

            [console]
            data_dir = "/var/lib/gatepass"

            [listing]
            rows_per_page = 25

            [dashboard]
            recent_count = 8
        "#;

        let settings = parse_config(config).unwrap();
        assert_eq!(
            settings.api.base_url.as_ref().map(|u| u.as_str()),
            Some("https://visitors.campus.example/")
        );
        assert_eq!(settings.api.timeout.as_secs(), 5);
        assert_eq!(settings.console.data_dir.to_string_lossy(), "/var/lib/gatepass");
        assert_eq!(settings.listing.rows_per_page, 25);
        assert_eq!(settings.dashboard.recent_count, 8);
    }

    #[test]
    fn reject_wrong_version() {
        let config = r#"
            config_version = 99
        "#;

        let result = parse_config(config);
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_invalid_values() {
        let config = r#"
            config_version = 1

            [api]
            base_url = "ftp://visitors.campus.example"
            timeout_seconds = 0

            [listing]
            rows_per_page = 0
        "#;

        match parse_config(config) {
            Err(ConfigError::ValidationFailed { errors }) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "config_version = 1").unwrap();
        writeln!(file, "[api]").unwrap();
        writeln!(file, "base_url = \"http://localhost:5000\"").unwrap();

        let settings = load_config(file.path()).unwrap();
        assert!(settings.api.base_url.is_some());
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
