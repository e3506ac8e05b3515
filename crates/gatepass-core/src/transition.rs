//! Check-in / check-out transition contract
//!
//! The visitor API owns the actual transitions. This module states the rules
//! both sides agree on, the service trait the console scans through, and an
//! in-memory service that applies the same rules for tests and offline demos.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatepass_api::{ScanResponse, StoredStatus, TransitionError, TransitionKind, VisitorPass};
use gatepass_util::{GatepassError, PassId, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Which transition a scan of `pass` at `now` should perform.
///
/// First scan checks in, second checks out, later scans are refused. A lapsed
/// window blocks check-in but never check-out, so a visitor can always leave.
pub fn next_transition(
    pass: &VisitorPass,
    now: DateTime<Utc>,
) -> std::result::Result<TransitionKind, TransitionError> {
    if pass.status.is_administrative() {
        return Err(TransitionError::Revoked {
            status: pass.status.clone(),
        });
    }

    match (pass.has_checked_in(), pass.has_checked_out()) {
        (false, _) => match pass.valid_until {
            Some(valid_until) if now > valid_until => Err(TransitionError::Expired { valid_until }),
            _ => Ok(TransitionKind::CheckIn),
        },
        (true, false) => Ok(TransitionKind::CheckOut),
        (true, true) => Err(TransitionError::AlreadyCheckedOut),
    }
}

/// Something that performs scan transitions on behalf of the console
#[async_trait]
pub trait TransitionService: Send + Sync {
    /// Submit a scanned pass id. A refused scan is an `Ok` response with
    /// `TransitionKind::Rejected`; `Err` means the service could not be asked.
    async fn scan(&self, pass_id: &PassId) -> Result<ScanResponse>;
}

/// In-memory transition service for testing
pub struct MockTransitionService {
    passes: Arc<Mutex<HashMap<PassId, VisitorPass>>>,
    now: Arc<Mutex<DateTime<Utc>>>,

    /// If set, the next scan fails with a transport error
    pub fail_next: Arc<Mutex<bool>>,
}

impl MockTransitionService {
    pub fn new(passes: impl IntoIterator<Item = VisitorPass>, now: DateTime<Utc>) -> Self {
        let passes = passes
            .into_iter()
            .map(|pass| (pass.pass_id.clone(), pass))
            .collect();
        Self {
            passes: Arc::new(Mutex::new(passes)),
            now: Arc::new(Mutex::new(now)),
            fail_next: Arc::new(Mutex::new(false)),
        }
    }

    /// Move the service clock
    pub fn set_now(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    /// Current record for a pass
    pub fn pass(&self, pass_id: &PassId) -> Option<VisitorPass> {
        self.passes.lock().ok()?.get(pass_id).cloned()
    }

    fn apply(
        pass: &mut VisitorPass,
        now: DateTime<Utc>,
    ) -> std::result::Result<TransitionKind, TransitionError> {
        let kind = next_transition(pass, now)?;
        match kind {
            TransitionKind::CheckIn => {
                pass.record_check_in(now)?;
                pass.status = StoredStatus::Active;
            }
            TransitionKind::CheckOut => {
                pass.record_check_out(now)?;
                pass.status = StoredStatus::CheckedOut;
            }
            TransitionKind::Rejected => {}
        }
        Ok(kind)
    }
}

#[async_trait]
impl TransitionService for MockTransitionService {
    async fn scan(&self, pass_id: &PassId) -> Result<ScanResponse> {
        {
            let mut fail = self
                .fail_next
                .lock()
                .map_err(|_| GatepassError::internal("mock lock poisoned"))?;
            if *fail {
                *fail = false;
                return Err(GatepassError::transport("simulated connection failure"));
            }
        }

        let now = *self
            .now
            .lock()
            .map_err(|_| GatepassError::internal("mock lock poisoned"))?;
        let mut passes = self
            .passes
            .lock()
            .map_err(|_| GatepassError::internal("mock lock poisoned"))?;

        let Some(pass) = passes.get_mut(pass_id) else {
            debug!(pass_id = %pass_id, "Mock scan for unknown pass");
            return Ok(ScanResponse::rejected("Visitor not found", None));
        };

        let response = match Self::apply(pass, now) {
            Ok(TransitionKind::CheckIn) => {
                ScanResponse::accepted(TransitionKind::CheckIn, pass.clone(), "Check-in successful")
            }
            Ok(TransitionKind::CheckOut) => ScanResponse::accepted(
                TransitionKind::CheckOut,
                pass.clone(),
                "Check-out successful",
            ),
            Ok(TransitionKind::Rejected) => ScanResponse::rejected("Scan rejected", Some(pass.clone())),
            Err(e) => ScanResponse::rejected(e.to_string(), Some(pass.clone())),
        };

        debug!(pass_id = %pass_id, kind = %response.kind, "Mock scan applied");
        Ok(response)
    }
}
