//! Store trait definitions

use chrono::{DateTime, Utc};
use gatepass_api::VisitorPass;
use gatepass_util::PassId;
use serde::{Deserialize, Serialize};

use crate::{AuditEvent, StoreResult};

/// Main store trait
pub trait Store: Send + Sync {
    // Audit log

    /// Append an audit event, returning its assigned id
    fn append_audit(&self, event: AuditEvent) -> StoreResult<i64>;

    /// Get recent audit events, newest first
    fn get_recent_audits(&self, limit: usize) -> StoreResult<Vec<AuditEvent>>;

    // Roster cache

    /// Replace the cached roster with a freshly fetched one, keeping API order.
    /// Returns the number of distinct passes cached; a repeated pass id keeps
    /// its first position and its last record.
    fn replace_roster(
        &self,
        passes: &[VisitorPass],
        fetched_at: DateTime<Utc>,
    ) -> StoreResult<usize>;

    /// Load the cached roster, if one was ever synced
    fn load_roster(&self) -> StoreResult<Option<RosterSnapshot>>;

    /// Get a single cached pass record
    fn get_pass(&self, pass_id: &PassId) -> StoreResult<Option<VisitorPass>>;

    /// Insert or refresh one pass record (e.g. the record returned by a scan)
    fn upsert_pass(&self, pass: &VisitorPass) -> StoreResult<()>;

    // Health

    /// Check if store is healthy
    fn is_healthy(&self) -> bool;
}

/// Cached roster for offline listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterSnapshot {
    /// When the roster was fetched from the visitor API
    pub fetched_at: DateTime<Utc>,

    /// Pass records in API order
    pub passes: Vec<VisitorPass>,
}
