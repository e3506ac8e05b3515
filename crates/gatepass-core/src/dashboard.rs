//! Dashboard summary

use chrono::{DateTime, Utc};
use gatepass_api::VisitorPass;
use serde::Serialize;

use crate::{tally, view, PassView};

/// Headline numbers and the most recent passes
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub total_visitors: usize,
    /// Checked in and still within their window
    pub inside_campus: usize,
    /// Checked in and out, window still open
    pub outside_campus: usize,
    /// Leading passes of the roster, which the API returns newest first
    pub recent: Vec<PassView>,
}

impl DashboardSummary {
    pub fn build(passes: &[VisitorPass], now: DateTime<Utc>, recent_count: usize) -> Self {
        let counts = tally(passes, now);
        Self {
            total_visitors: counts.total,
            inside_campus: counts.active,
            outside_campus: counts.not_active,
            recent: passes
                .iter()
                .take(recent_count)
                .map(|pass| view(pass, now))
                .collect(),
        }
    }
}
