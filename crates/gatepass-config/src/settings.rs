//! Validated settings

use crate::schema::RawConfig;
use crate::validation::parse_base_url;
use gatepass_util::default_data_dir;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Rows per listing page when unset
pub const DEFAULT_ROWS_PER_PAGE: usize = 10;

/// Recent passes on the dashboard when unset
pub const DEFAULT_RECENT_COUNT: usize = 5;

/// Request timeout when unset
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Validated settings ready for use by the console
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub api: ApiSettings,
    pub console: ConsoleSettings,
    pub listing: ListingSettings,
    pub dashboard: DashboardSettings,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            api: ApiSettings {
                // Validation already rejected unparsable URLs
                base_url: raw.api.base_url.as_deref().and_then(|u| parse_base_url(u).ok()),
                timeout: raw
                    .api
                    .timeout_seconds
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_TIMEOUT),
            },
            console: ConsoleSettings {
                data_dir: raw.console.data_dir.unwrap_or_else(default_data_dir),
            },
            listing: ListingSettings {
                rows_per_page: raw.listing.rows_per_page.unwrap_or(DEFAULT_ROWS_PER_PAGE),
            },
            dashboard: DashboardSettings {
                recent_count: raw.dashboard.recent_count.unwrap_or(DEFAULT_RECENT_COUNT),
            },
        }
    }
}

/// Visitor API connection
#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// None when no API is configured; only offline commands work then
    pub base_url: Option<Url>,
    pub timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Console storage
#[derive(Debug, Clone)]
pub struct ConsoleSettings {
    pub data_dir: PathBuf,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Listing layout
#[derive(Debug, Clone)]
pub struct ListingSettings {
    pub rows_per_page: usize,
}

impl Default for ListingSettings {
    fn default() -> Self {
        Self {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

/// Dashboard layout
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub recent_count: usize,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            recent_count: DEFAULT_RECENT_COUNT,
        }
    }
}
