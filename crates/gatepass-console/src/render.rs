//! Plain-text rendering of console output

use gatepass_core::PassView;
use gatepass_store::{AuditEvent, AuditEventType};
use gatepass_util::{format_datetime_full, format_optional_clock_time, format_short_date};
use std::fmt::Write;

use crate::{
    DashboardOutput, ListOutput, PassCard, ReportOutput, RosterSource, ScanOutcome, SyncReport,
};

/// Status label with the pulsing marker and any administrative state
pub fn status_badge(view: &PassView) -> String {
    let mut badge = String::new();
    if view.style.pulsing {
        badge.push_str("* ");
    }
    badge.push_str(view.status.label());
    if view.is_revoked() {
        let _ = write!(badge, " [{}]", view.stored_status);
    }
    badge
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

/// Table of passes, one row each
pub fn render_pass_table(views: &[PassView]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:<22} {:<18} {:<9} {:<9} {:<12} STATUS",
        "PASS ID", "NAME", "HOST", "IN", "OUT", "VALID UNTIL"
    );
    for view in views {
        let pass = &view.pass;
        let valid_until = pass
            .valid_until
            .as_ref()
            .map(format_short_date)
            .unwrap_or_else(|| "--".to_string());
        let _ = writeln!(
            out,
            "{:<12} {:<22} {:<18} {:<9} {:<9} {:<12} {}",
            truncate(pass.pass_id.as_str(), 12),
            truncate(&pass.full_name, 22),
            truncate(&pass.host_name, 18),
            format_optional_clock_time(pass.check_in_time.as_ref()),
            format_optional_clock_time(pass.check_out_time.as_ref()),
            valid_until,
            status_badge(view),
        );
    }
    out
}

fn source_note(source: RosterSource, fetched_at: &chrono::DateTime<chrono::Utc>) -> String {
    match source {
        RosterSource::Live => format!("live, fetched {}", format_datetime_full(fetched_at)),
        RosterSource::Cached => format!("cached, fetched {}", format_datetime_full(fetched_at)),
    }
}

pub fn render_list(list: &ListOutput) -> String {
    let mut out = String::new();
    if let Some(term) = &list.search {
        let _ = writeln!(out, "Search: {:?}", term);
    }
    out.push_str(&render_pass_table(&list.page.items));
    let _ = writeln!(
        out,
        "Showing {} to {} of {} | page {} of {} ({})",
        list.page.first_index(),
        list.page.last_index(),
        list.page.total,
        list.page.page,
        list.page.total_pages.max(1),
        source_note(list.source, &list.fetched_at),
    );
    out
}

pub fn render_report(report: &ReportOutput) -> String {
    let mut out = String::new();
    let counts = &report.counts;
    let _ = writeln!(out, "Total visitors:   {}", counts.total);
    let _ = writeln!(out, "Active:           {}", counts.active);
    let _ = writeln!(out, "Not Active:       {}", counts.not_active);
    let _ = writeln!(out, "Registered:       {}", counts.registered);
    let _ = writeln!(out, "Expired:          {}", counts.expired);
    match report.today_registrations {
        Some(n) => {
            let _ = writeln!(out, "Registered today: {}", n);
        }
        None => {
            let _ = writeln!(out, "Registered today: unavailable");
        }
    }

    out.push_str("\nStatus distribution\n");
    if report.slices.is_empty() {
        out.push_str("  (no passes)\n");
    }
    for slice in &report.slices {
        let _ = writeln!(out, "  {:<11} {:>5}  {}", slice.label, slice.value, slice.color);
    }
    out
}

pub fn render_dashboard(dashboard: &DashboardOutput) -> String {
    let summary = &dashboard.summary;
    let mut out = String::new();
    let _ = writeln!(out, "Total visitors:  {}", summary.total_visitors);
    let _ = writeln!(out, "Inside campus:   {}", summary.inside_campus);
    let _ = writeln!(out, "Outside campus:  {}", summary.outside_campus);
    out.push_str("\nRecent passes\n");
    out.push_str(&render_pass_table(&summary.recent));
    out
}

pub fn render_scan(outcome: &ScanOutcome) -> String {
    let view = &outcome.view;
    let mut out = String::new();

    let heading = match view.kind {
        gatepass_api::TransitionKind::CheckIn => "CHECKED IN",
        gatepass_api::TransitionKind::CheckOut => "CHECKED OUT",
        gatepass_api::TransitionKind::Rejected => "REJECTED",
    };
    let _ = writeln!(out, "{}", heading);
    if let Some(message) = &view.message {
        let _ = writeln!(out, "{}", message);
    }

    if let Some(pass) = &view.pass {
        let _ = writeln!(out, "Pass:    {}", pass.pass.pass_id);
        let _ = writeln!(out, "Visitor: {}", pass.pass.full_name);
        if !pass.pass.host_name.is_empty() {
            let _ = writeln!(out, "Host:    {}", pass.pass.host_name);
        }
        let _ = writeln!(out, "Status:  {}", status_badge(pass));
    }

    if view.inconsistent {
        let _ = writeln!(
            out,
            "Warning: the visitor API's answer does not match its record (reported status: {}); showing the status computed from the record",
            view.reported_status.as_deref().unwrap_or("none")
        );
    }
    out
}

pub fn render_pass_card(card: &PassCard) -> String {
    let pass = &card.view.pass;
    let mut out = String::new();

    let _ = writeln!(out, "{}", pass.visitor_type.label());
    let _ = writeln!(out, "Pass:    {}", pass.pass_id);
    let _ = writeln!(out, "Visitor: {}", pass.full_name);
    if !pass.phone.is_empty() {
        let _ = writeln!(out, "Phone:   {}", pass.phone);
    }
    if !pass.host_name.is_empty() {
        let _ = writeln!(out, "Host:    {}", pass.host_name);
    }
    if !pass.purpose.is_empty() {
        let _ = writeln!(out, "Purpose: {}", pass.purpose);
    }
    if let Some(valid_until) = &pass.valid_until {
        let _ = writeln!(out, "Valid:   until {}", format_datetime_full(valid_until));
    }
    let _ = writeln!(out, "Status:  {}", status_badge(&card.view));
    let _ = writeln!(out, "QR:      {}", card.qr_text);
    out
}

pub fn render_sync(report: &SyncReport) -> String {
    format!(
        "Synced {} passes at {}\n",
        report.pass_count,
        format_datetime_full(&report.fetched_at)
    )
}

/// One-line description of an audit event
pub fn describe_event(event: &AuditEventType) -> String {
    match event {
        AuditEventType::ConsoleStarted => "console started".to_string(),
        AuditEventType::RosterSynced { pass_count } => format!("roster synced ({} passes)", pass_count),
        AuditEventType::PassRegistered { pass_id } => format!("registered {}", pass_id),
        AuditEventType::InvalidQr { error } => format!("unreadable scan: {}", error),
        AuditEventType::ScanSubmitted { scan_id, pass_id } => {
            format!("scan {} submitted for {}", scan_id, pass_id)
        }
        AuditEventType::ScanAccepted {
            pass_id,
            kind,
            status,
            ..
        } => format!("{} {} -> {}", kind, pass_id, status),
        AuditEventType::ScanRejected {
            pass_id, message, ..
        } => format!("scan of {} rejected: {}", pass_id, message),
        AuditEventType::ScanInconsistent {
            pass_id,
            kind,
            reported_status,
            computed_status,
            ..
        } => format!(
            "{} {} inconsistent: reported {}, computed {}",
            kind,
            pass_id,
            reported_status.as_deref().unwrap_or("none"),
            computed_status
        ),
        AuditEventType::ScanFailed { pass_id, error, .. } => {
            format!("scan of {} failed: {}", pass_id, error)
        }
    }
}

pub fn render_audit(events: &[AuditEvent]) -> String {
    let mut out = String::new();
    for event in events {
        let _ = writeln!(
            out,
            "{:>6}  {}  {}",
            event.id,
            format_datetime_full(&event.timestamp),
            describe_event(&event.event)
        );
    }
    if events.is_empty() {
        out.push_str("(no audit events)\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gatepass_api::{StoredStatus, VisitorPass};
    use gatepass_core::view;

    #[test]
    fn badge_marks_active_and_revoked() {
        let now = Utc.with_ymd_and_hms(2025, 1, 20, 10, 0, 0).unwrap();
        let mut pass = VisitorPass::new("VIS-1", "Guest");
        pass.check_in_time = Some(Utc.with_ymd_and_hms(2025, 1, 20, 9, 0, 0).unwrap());
        assert_eq!(status_badge(&view(&pass, now)), "* Active");

        let mut cancelled = VisitorPass::new("VIS-2", "Guest");
        cancelled.status = StoredStatus::Cancelled;
        assert_eq!(status_badge(&view(&cancelled, now)), "Registered [Cancelled]");
    }

    #[test]
    fn pass_card_shows_qr_text() {
        let now = Utc.with_ymd_and_hms(2025, 1, 20, 10, 0, 0).unwrap();
        let pass = VisitorPass::new("VIS-9", "Guest").with_host("Dr. Menon", "Seminar");
        let card = PassCard::new(RosterSource::Live, view(&pass, now)).unwrap();
        let text = render_pass_card(&card);

        assert!(text.starts_with("One-Day Pass\n"));
        assert!(text.contains("Host:    Dr. Menon"));
        assert!(!text.contains("Phone:"));
        assert!(text.contains(r#"QR:      {"passId":"VIS-9""#));
    }

    #[test]
    fn registration_event_description() {
        let event = AuditEventType::PassRegistered {
            pass_id: gatepass_util::PassId::new("VIS-9"),
        };
        assert_eq!(describe_event(&event), "registered VIS-9");
    }

    #[test]
    fn table_truncates_long_names() {
        let now = Utc.with_ymd_and_hms(2025, 1, 20, 10, 0, 0).unwrap();
        let pass = VisitorPass::new("VIS-1", "A Very Long Visitor Name Indeed");
        let table = render_pass_table(&[view(&pass, now)]);
        assert!(table.contains("A Very Long Visitor N~"));
        assert!(table.lines().nth(1).unwrap().ends_with("Registered"));
    }
}
