//! Visitor pass records

use chrono::{DateTime, NaiveDate, Utc};
use gatepass_util::{lenient_timestamp, PassId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How the pass's validity was set up at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VisitorType {
    #[default]
    OneDay,
    MultiDay,
}

impl VisitorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitorType::OneDay => "oneday",
            VisitorType::MultiDay => "multiday",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VisitorType::OneDay => "One-Day Pass",
            VisitorType::MultiDay => "Multi-Day Pass",
        }
    }
}

impl From<String> for VisitorType {
    fn from(s: String) -> Self {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "multiday" => VisitorType::MultiDay,
            // Legacy records carry no type at all; they are one-day passes
            _ => VisitorType::OneDay,
        }
    }
}

impl From<VisitorType> for String {
    fn from(t: VisitorType) -> Self {
        t.as_str().to_string()
    }
}

/// Lifecycle status as last persisted by the visitor API.
///
/// This is a creation-time seed or an administrative state. It is never the
/// status shown to operators; see `gatepass_core::classify`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StoredStatus {
    #[default]
    Registered,
    Active,
    CheckedOut,
    Cancelled,
    Other(String),
}

impl StoredStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StoredStatus::Registered => "Registered",
            StoredStatus::Active => "Active",
            StoredStatus::CheckedOut => "Checked Out",
            StoredStatus::Cancelled => "Cancelled",
            StoredStatus::Other(s) => s,
        }
    }

    /// Terminal states set by an operator rather than by a scan
    pub fn is_administrative(&self) -> bool {
        matches!(self, StoredStatus::Cancelled)
    }
}

impl From<String> for StoredStatus {
    fn from(s: String) -> Self {
        match s.trim() {
            "Registered" => StoredStatus::Registered,
            "Active" => StoredStatus::Active,
            "Checked Out" => StoredStatus::CheckedOut,
            "Cancelled" | "Canceled" => StoredStatus::Cancelled,
            other => StoredStatus::Other(other.to_string()),
        }
    }
}

impl From<StoredStatus> for String {
    fn from(s: StoredStatus) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for StoredStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A visitor's access credential as returned by `GET /api/visitors`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorPass {
    /// Backend document id, when the record came from the API
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,

    pub pass_id: PassId,

    #[serde(default)]
    pub full_name: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub visitor_type: VisitorType,

    #[serde(default)]
    pub purpose: String,

    #[serde(default)]
    pub host_name: String,

    /// Absolute validity deadline. None means the pass never lapses.
    #[serde(default, with = "lenient_timestamp")]
    pub valid_until: Option<DateTime<Utc>>,

    #[serde(default)]
    pub status: StoredStatus,

    #[serde(default, with = "lenient_timestamp")]
    pub check_in_time: Option<DateTime<Utc>>,

    #[serde(default, with = "lenient_timestamp")]
    pub check_out_time: Option<DateTime<Utc>>,

    #[serde(default, with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl VisitorPass {
    /// A freshly registered pass with no visits recorded
    pub fn new(pass_id: impl Into<PassId>, full_name: impl Into<String>) -> Self {
        Self {
            record_id: None,
            pass_id: pass_id.into(),
            full_name: full_name.into(),
            phone: String::new(),
            visitor_type: VisitorType::OneDay,
            purpose: String::new(),
            host_name: String::new(),
            valid_until: None,
            status: StoredStatus::Registered,
            check_in_time: None,
            check_out_time: None,
            created_at: None,
        }
    }

    pub fn with_valid_until(mut self, valid_until: DateTime<Utc>) -> Self {
        self.valid_until = Some(valid_until);
        self
    }

    pub fn with_host(mut self, host_name: impl Into<String>, purpose: impl Into<String>) -> Self {
        self.host_name = host_name.into();
        self.purpose = purpose.into();
        self
    }

    pub fn has_checked_in(&self) -> bool {
        self.check_in_time.is_some()
    }

    pub fn has_checked_out(&self) -> bool {
        self.check_out_time.is_some()
    }

    /// Whether the validity window has lapsed at `now`. Strictly after the deadline.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.is_some_and(|deadline| now > deadline)
    }

    /// Record the entry scan. Check-in happens at most once per pass.
    pub fn record_check_in(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        if self.check_in_time.is_some() {
            return Err(TransitionError::AlreadyCheckedIn);
        }
        self.check_in_time = Some(at);
        Ok(())
    }

    /// Record the exit scan. Requires a prior check-in and happens at most once.
    pub fn record_check_out(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        let checked_in = self.check_in_time.ok_or(TransitionError::NotCheckedIn)?;
        if self.check_out_time.is_some() {
            return Err(TransitionError::AlreadyCheckedOut);
        }
        if at < checked_in {
            return Err(TransitionError::CheckOutBeforeCheckIn);
        }
        self.check_out_time = Some(at);
        Ok(())
    }
}

/// Why a check-in or check-out cannot be applied to a pass
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Visitor has already checked in")]
    AlreadyCheckedIn,

    #[error("Visitor has already checked out")]
    AlreadyCheckedOut,

    #[error("Visitor has not checked in")]
    NotCheckedIn,

    #[error("Check-out time precedes check-in time")]
    CheckOutBeforeCheckIn,

    #[error("Pass expired at {valid_until}")]
    Expired { valid_until: DateTime<Utc> },

    #[error("Pass is {status}")]
    Revoked { status: StoredStatus },
}

/// One row of `GET /api/visitors/stats`: registrations per day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub visitors: u64,
}
