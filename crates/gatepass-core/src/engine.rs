//! Pass status classification

use chrono::{DateTime, Utc};
use gatepass_api::{PassStatus, StatusStyle, StoredStatus, VisitorPass};
use serde::Serialize;

/// Classify a pass at `now`.
///
/// Precedence:
/// 1. Checked in and not out: `Expired` once the window lapses, else `Active`.
/// 2. Window lapsed: `Expired`.
/// 3. Checked in and out: `NotActive`.
/// 4. Otherwise `Registered`.
///
/// Only the three timestamps are consulted. The stored status string is never
/// read, so a stale `"Active"` on a checked-out record cannot leak through.
pub fn classify(pass: &VisitorPass, now: DateTime<Utc>) -> PassStatus {
    let expired = pass.is_expired_at(now);
    let checked_in = pass.has_checked_in();
    let checked_out = pass.has_checked_out();

    if checked_in && !checked_out {
        if expired {
            PassStatus::Expired
        } else {
            PassStatus::Active
        }
    } else if expired {
        PassStatus::Expired
    } else if checked_in && checked_out {
        PassStatus::NotActive
    } else {
        PassStatus::Registered
    }
}

/// A pass paired with everything a screen needs to render it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassView {
    pub pass: VisitorPass,
    pub status: PassStatus,
    pub style: StatusStyle,
    /// What the visitor API last persisted; shown next to the computed status
    pub stored_status: StoredStatus,
}

impl PassView {
    /// Cancelled and similar states set by an operator
    pub fn is_revoked(&self) -> bool {
        self.stored_status.is_administrative()
    }
}

/// Build the display view of a single pass
pub fn view(pass: &VisitorPass, now: DateTime<Utc>) -> PassView {
    let status = classify(pass, now);
    PassView {
        pass: pass.clone(),
        status,
        style: status.style(),
        stored_status: pass.status.clone(),
    }
}

/// Build views for a whole roster, keeping its order
pub fn view_all(passes: &[VisitorPass], now: DateTime<Utc>) -> Vec<PassView> {
    passes.iter().map(|pass| view(pass, now)).collect()
}
