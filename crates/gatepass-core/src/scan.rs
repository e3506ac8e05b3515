//! Reconciling scan responses with the returned record

use chrono::{DateTime, Utc};
use gatepass_api::{ScanResponse, TransitionKind};
use serde::Serialize;
use tracing::warn;

use crate::{view, PassView};

/// What the console shows after a scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanView {
    pub kind: TransitionKind,
    pub message: Option<String>,
    /// Returned record, re-classified locally
    pub pass: Option<PassView>,
    /// Status label the service claimed, kept for the audit trail
    pub reported_status: Option<String>,
    /// The service's claims contradict its own record
    pub inconsistent: bool,
}

impl ScanView {
    pub fn is_accepted(&self) -> bool {
        self.kind != TransitionKind::Rejected
    }
}

/// Re-classify the record a scan returned.
///
/// The displayed status is always computed from the record's timestamps. The
/// view is flagged inconsistent when the reported transition has no matching
/// timestamp on the record, or a reported status label disagrees with the
/// computed one.
pub fn reconcile_scan(response: ScanResponse, now: DateTime<Utc>) -> ScanView {
    let pass = response.visitor.as_ref().map(|visitor| view(visitor, now));

    let kind_mismatch = match (response.kind, &response.visitor) {
        (TransitionKind::CheckIn, Some(visitor)) => !visitor.has_checked_in(),
        (TransitionKind::CheckOut, Some(visitor)) => !visitor.has_checked_out(),
        (TransitionKind::CheckIn | TransitionKind::CheckOut, None) => true,
        (TransitionKind::Rejected, _) => false,
    };

    let status_mismatch = match (&response.status, &pass) {
        (Some(reported), Some(pass)) => reported.trim() != pass.status.label(),
        _ => false,
    };

    let inconsistent = kind_mismatch || status_mismatch;
    if inconsistent {
        warn!(
            kind = %response.kind,
            pass_id = ?response.visitor.as_ref().map(|v| v.pass_id.as_str()),
            reported_status = ?response.status,
            computed_status = ?pass.as_ref().map(|p| p.status.label()),
            "Scan response contradicts returned record"
        );
    }

    ScanView {
        kind: response.kind,
        message: response.message,
        pass,
        reported_status: response.status,
        inconsistent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use gatepass_api::{PassStatus, VisitorPass};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 20, h, m, 0).unwrap()
    }

    fn checked_in() -> VisitorPass {
        let mut pass = VisitorPass::new("VIS-1", "Guest").with_valid_until(at(23, 59));
        pass.check_in_time = Some(at(9, 0));
        pass
    }

    #[test]
    fn consistent_check_in() {
        let response = ScanResponse::accepted(TransitionKind::CheckIn, checked_in(), "Welcome");
        let view = reconcile_scan(response, at(9, 0));
        assert!(view.is_accepted());
        assert!(!view.inconsistent);
        assert_eq!(view.pass.unwrap().status, PassStatus::Active);
    }

    #[test]
    fn check_out_without_timestamp_is_flagged() {
        let response = ScanResponse::accepted(TransitionKind::CheckOut, checked_in(), "Bye");
        let view = reconcile_scan(response, at(11, 0));
        assert!(view.inconsistent);
        assert_eq!(view.pass.unwrap().status, PassStatus::Active);
    }

    #[test]
    fn conflicting_status_string_loses_to_record() {
        let mut visitor = checked_in();
        visitor.check_out_time = Some(at(11, 0));
        let mut response = ScanResponse::accepted(TransitionKind::CheckOut, visitor, "Bye");
        response.status = Some("Active".into());

        let view = reconcile_scan(response, at(12, 0));
        assert!(view.inconsistent);
        assert_eq!(view.pass.unwrap().status, PassStatus::NotActive);
        assert_eq!(view.reported_status.as_deref(), Some("Active"));
    }

    #[test]
    fn accepted_without_record_is_flagged() {
        let mut response = ScanResponse::rejected("x", None);
        response.kind = TransitionKind::CheckIn;
        assert!(reconcile_scan(response, at(9, 0)).inconsistent);
    }

    #[test]
    fn rejection_is_not_inconsistent() {
        let response = ScanResponse::rejected("Visitor already checked out", Some(checked_in()));
        let view = reconcile_scan(response, at(12, 0));
        assert!(!view.is_accepted());
        assert!(!view.inconsistent);
        assert_eq!(view.message.as_deref(), Some("Visitor already checked out"));
    }
}
