//! Audit event types

use chrono::{DateTime, Utc};
use gatepass_api::{PassStatus, TransitionKind};
use gatepass_util::{PassId, ScanId};
use serde::{Deserialize, Serialize};

/// Types of audit events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEventType {
    /// Console process started
    ConsoleStarted,

    /// Roster fetched from the visitor API and cached
    RosterSynced { pass_count: usize },

    /// New pass created through the visitor API
    PassRegistered { pass_id: PassId },

    /// Scanned text could not be decoded into a pass id
    InvalidQr { error: String },

    /// Pass id submitted to the transition service
    ScanSubmitted { scan_id: ScanId, pass_id: PassId },

    /// Service performed a check-in or check-out
    ScanAccepted {
        scan_id: ScanId,
        pass_id: PassId,
        kind: TransitionKind,
        status: PassStatus,
    },

    /// Service refused the scan
    ScanRejected {
        scan_id: ScanId,
        pass_id: PassId,
        message: String,
    },

    /// Service response contradicted its own record
    ScanInconsistent {
        scan_id: ScanId,
        pass_id: PassId,
        kind: TransitionKind,
        reported_status: Option<String>,
        computed_status: PassStatus,
    },

    /// Scan could not reach the service
    ScanFailed {
        scan_id: ScanId,
        pass_id: PassId,
        error: String,
    },
}

/// Full audit event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Unique event ID
    pub id: i64,

    /// Event timestamp
    pub timestamp: DateTime<Utc>,

    /// Event type and details
    pub event: AuditEventType,
}

impl AuditEvent {
    pub fn new(event: AuditEventType) -> Self {
        Self {
            id: 0, // Will be set by store
            timestamp: gatepass_util::now(),
            event,
        }
    }
}
