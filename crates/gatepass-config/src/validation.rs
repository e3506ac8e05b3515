//! Configuration validation

use crate::schema::RawConfig;
use thiserror::Error;
use url::Url;

/// Validation error
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("Invalid API base URL '{value}': {message}")]
    InvalidBaseUrl { value: String, message: String },

    #[error("'{field}' must be greater than zero")]
    MustBePositive { field: &'static str },

    #[error("Global config error: {0}")]
    GlobalError(String),
}

/// Validate a raw configuration
pub fn validate_config(config: &RawConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(base_url) = &config.api.base_url {
        if let Err(message) = parse_base_url(base_url) {
            errors.push(ValidationError::InvalidBaseUrl {
                value: base_url.clone(),
                message,
            });
        }
    }

    if config.api.timeout_seconds == Some(0) {
        errors.push(ValidationError::MustBePositive {
            field: "api.timeout_seconds",
        });
    }

    if config.listing.rows_per_page == Some(0) {
        errors.push(ValidationError::MustBePositive {
            field: "listing.rows_per_page",
        });
    }

    if config.dashboard.recent_count == Some(0) {
        errors.push(ValidationError::MustBePositive {
            field: "dashboard.recent_count",
        });
    }

    if let Some(dir) = &config.console.data_dir {
        if dir.as_os_str().is_empty() {
            errors.push(ValidationError::GlobalError(
                "console.data_dir cannot be empty".into(),
            ));
        }
    }

    errors
}

/// Parse an http(s) base URL, normalizing it to end with `/` so endpoint
/// paths join beneath it rather than replacing its last segment.
pub fn parse_base_url(s: &str) -> Result<Url, String> {
    let mut url = Url::parse(s.trim()).map_err(|e| e.to_string())?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{}'", other)),
    }

    if url.host_str().is_none() {
        return Err("missing host".into());
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
