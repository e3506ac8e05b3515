//! Time utilities for gatepass
//!
//! Everything that compares instants works in UTC. Pass records arrive from
//! the visitor API as loosely formatted strings, so this module also owns the
//! normalization of those strings into an explicit `Option<DateTime<Utc>>`.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `GATEPASS_MOCK_TIME` environment variable can be set
//! to override the clock returned by [`now`]. The value is read as UTC and
//! advances at the same rate as real time, which makes it easy to watch passes
//! lapse into `Expired` without waiting for a real deadline.
//!
//! Format: `YYYY-MM-DD HH:MM:SS` (e.g., `2025-12-25 14:30:00`)
//!
//! Example:
//! ```bash
//! GATEPASS_MOCK_TIME="2025-12-25 14:30:00" gatepass list --offline
//! ```

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use std::sync::OnceLock;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "GATEPASS_MOCK_TIME";

/// Cached mock time offset from the real time when the process started.
static MOCK_TIME_OFFSET: OnceLock<Option<chrono::Duration>> = OnceLock::new();

/// Naive formats accepted in addition to RFC 3339. All are read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

#[allow(clippy::disallowed_methods)] // This is the internal implementation that wraps Utc::now()
fn get_mock_time_offset() -> Option<chrono::Duration> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match NaiveDateTime::parse_from_str(&mock_time_str, "%Y-%m-%d %H:%M:%S") {
                    Ok(naive_dt) => {
                        let mock_dt = Utc.from_utc_datetime(&naive_dt);
                        let offset = mock_dt.signed_duration_since(Utc::now());
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    }
                    Err(_) => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            expected_format = "%Y-%m-%d %H:%M:%S",
                            "Invalid mock time format"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current time, respecting mock time settings in debug builds.
///
/// This is the only place gatepass reads the wall clock. Classification never
/// calls it; callers read the clock once and pass the instant down.
#[allow(clippy::disallowed_methods)] // This is the wrapper that provides mock time support
pub fn now() -> DateTime<Utc> {
    let real_now = Utc::now();

    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Parse a timestamp as the visitor API emits it.
///
/// Accepts RFC 3339 (`2025-01-20T09:00:00.000Z`, `2025-01-20T09:00:00+05:30`),
/// naive date-times (read as UTC) and bare dates (midnight UTC). Anything else,
/// including an empty string, is treated as absent.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| Utc.from_utc_datetime(&naive));
    }

    tracing::debug!(value = %s, "Discarding unparsable timestamp");
    None
}

/// Serde adapter for optional timestamps on records from the visitor API.
///
/// Deserializing never fails: `null`, a missing field (with `#[serde(default)]`),
/// a non-string value or an unparsable string all become `None`. Integers are
/// read as epoch milliseconds. Serializing writes RFC 3339 with milliseconds.
///
/// ```ignore
/// #[serde(default, with = "gatepass_util::lenient_timestamp")]
/// check_in_time: Option<DateTime<Utc>>,
/// ```
pub mod lenient_timestamp {
    use super::parse_timestamp;
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(String),
        Millis(i64),
        Other(serde::de::IgnoredAny),
    }

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => {
                serializer.serialize_some(&dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawTimestamp>::deserialize(deserializer)?;
        Ok(match raw {
            Some(RawTimestamp::Text(s)) => parse_timestamp(&s),
            Some(RawTimestamp::Millis(ms)) => DateTime::from_timestamp_millis(ms),
            Some(RawTimestamp::Other(_)) | None => None,
        })
    }
}

/// Parse a `--at` style argument: an RFC 3339 timestamp, a naive date-time, or a date.
pub fn parse_instant_arg(raw: &str) -> Result<DateTime<Utc>, String> {
    parse_timestamp(raw).ok_or_else(|| {
        format!(
            "invalid timestamp '{}': expected RFC 3339, 'YYYY-MM-DD HH:MM:SS' or 'YYYY-MM-DD'",
            raw
        )
    })
}

/// Format an instant as a short local clock time for tables (e.g. `09:05 AM`).
pub fn format_clock_time(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%I:%M %p").to_string()
}

/// Format an instant as a short local date (e.g. `Jan 20`).
pub fn format_short_date(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%b %d").to_string()
}

/// Format an optional instant for display, `--` when absent.
pub fn format_optional_clock_time(dt: Option<&DateTime<Utc>>) -> String {
    dt.map(format_clock_time).unwrap_or_else(|| "--".to_string())
}

/// Format an instant as RFC 3339 with second precision.
pub fn format_datetime_full(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Record {
        #[serde(default, with = "super::lenient_timestamp")]
        at: Option<DateTime<Utc>>,
    }

    #[test]
    fn parses_rfc3339_with_millis() {
        let dt = parse_timestamp("2025-01-20T09:00:00.000Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 20, 9, 0, 0).unwrap());
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_timestamp("2025-01-20T14:30:00+05:30").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 20, 9, 0, 0).unwrap());
    }

    #[test]
    fn parses_naive_datetime_as_utc() {
        let dt = parse_timestamp("2025-01-20 23:59:00").unwrap();
        assert_eq!(dt.hour(), 23);
        assert_eq!(dt.minute(), 59);

        let dt = parse_timestamp("2025-01-20T08:15").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 20, 8, 15, 0).unwrap());
    }

    #[test]
    fn parses_bare_date_as_midnight_utc() {
        let dt = parse_timestamp("2025-01-20").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 1, 20, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("   ").is_none());
        assert!(parse_timestamp("Invalid Date").is_none());
        assert!(parse_timestamp("2025-13-40").is_none());
    }

    #[test]
    fn lenient_deserialize_never_fails() {
        let cases = [
            (r#"{"at": "2025-01-20T09:00:00Z"}"#, true),
            (r#"{"at": null}"#, false),
            (r#"{}"#, false),
            (r#"{"at": "not a date"}"#, false),
            (r#"{"at": {"$date": 1}}"#, false),
            (r#"{"at": true}"#, false),
            (r#"{"at": 1737363600000}"#, true),
        ];

        for (json, present) in cases {
            let record: Record = serde_json::from_str(json).unwrap();
            assert_eq!(record.at.is_some(), present, "case {}", json);
        }
    }

    #[test]
    fn lenient_serialize_round_trips() {
        let record = Record {
            at: Some(Utc.with_ymd_and_hms(2025, 1, 20, 9, 0, 0).unwrap()),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"at":"2025-01-20T09:00:00.000Z"}"#);

        let empty = serde_json::to_string(&Record { at: None }).unwrap();
        assert_eq!(empty, r#"{"at":null}"#);
    }

    #[test]
    fn instant_arg_reports_bad_input() {
        assert!(parse_instant_arg("2025-01-20 10:00:00").is_ok());
        let err = parse_instant_arg("yesterday").unwrap_err();
        assert!(err.contains("yesterday"));
    }

    #[test]
    fn optional_formatting() {
        assert_eq!(format_optional_clock_time(None), "--");
        let dt = Utc.with_ymd_and_hms(2025, 1, 20, 9, 0, 0).unwrap();
        assert_eq!(format_datetime_full(&dt), "2025-01-20T09:00:00Z");
        assert!(format_optional_clock_time(Some(&dt)).ends_with('M'));
    }
}
