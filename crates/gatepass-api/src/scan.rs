//! Scan exchange with the visitor API
//!
//! `POST /api/visitors/scan` takes `{ "passId": ... }`. On success it answers
//! `{ "visitor": {...}, "message": "...", "type": "check-in" | "check-out" }`;
//! on rejection it answers with a non-2xx status and `{ "message", "visitor"? }`.

use gatepass_util::PassId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::VisitorPass;

/// Body of a scan request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub pass_id: PassId,
}

impl ScanRequest {
    pub fn new(pass_id: PassId) -> Self {
        Self { pass_id }
    }
}

/// What the external transition service did with a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TransitionKind {
    CheckIn,
    CheckOut,
    Rejected,
}

impl TransitionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionKind::CheckIn => "check-in",
            TransitionKind::CheckOut => "check-out",
            TransitionKind::Rejected => "rejected",
        }
    }
}

impl From<String> for TransitionKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "check-in" => TransitionKind::CheckIn,
            "check-out" => TransitionKind::CheckOut,
            _ => TransitionKind::Rejected,
        }
    }
}

impl From<TransitionKind> for String {
    fn from(kind: TransitionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn rejected() -> TransitionKind {
    TransitionKind::Rejected
}

/// Result of a scan as reported by the transition service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResponse {
    #[serde(rename = "type", default = "rejected")]
    pub kind: TransitionKind,

    #[serde(default)]
    pub message: Option<String>,

    /// Updated record, when the service returned one
    #[serde(default)]
    pub visitor: Option<VisitorPass>,

    /// Status label the service claims for the visitor, if it sent one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ScanResponse {
    pub fn accepted(kind: TransitionKind, visitor: VisitorPass, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
            visitor: Some(visitor),
            status: None,
        }
    }

    pub fn rejected(message: impl Into<String>, visitor: Option<VisitorPass>) -> Self {
        Self {
            kind: TransitionKind::Rejected,
            message: Some(message.into()),
            visitor,
            status: None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.kind != TransitionKind::Rejected
    }
}

/// Error body sent with non-2xx scan responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanErrorBody {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub visitor: Option<VisitorPass>,
}

impl ScanErrorBody {
    /// The refusal this body describes. Bodies without a message are not
    /// refusals from the scan service (proxy pages, empty answers).
    pub fn into_rejection(self) -> Option<ScanResponse> {
        let message = self.message.filter(|m| !m.trim().is_empty())?;
        Some(ScanResponse::rejected(message, self.visitor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = serde_json::to_string(&ScanRequest::new(PassId::new("VIS-9"))).unwrap();
        assert_eq!(body, r#"{"passId":"VIS-9"}"#);
    }

    #[test]
    fn parse_check_in_response() {
        let json = r#"{
            "message": "Check-in successful",
            "type": "check-in",
            "visitor": {
                "passId": "VIS-9",
                "fullName": "Guest",
                "checkInTime": "2025-01-20T09:00:00.000Z",
                "status": "Active"
            }
        }"#;

        let response: ScanResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.kind, TransitionKind::CheckIn);
        assert!(response.is_accepted());
        assert!(response.visitor.unwrap().check_in_time.is_some());
    }

    #[test]
    fn unknown_or_missing_kind_is_rejection() {
        let response: ScanResponse =
            serde_json::from_str(r#"{"type": "error", "message": "nope"}"#).unwrap();
        assert_eq!(response.kind, TransitionKind::Rejected);

        let response: ScanResponse = serde_json::from_str(r#"{"message": "nope"}"#).unwrap();
        assert_eq!(response.kind, TransitionKind::Rejected);
        assert!(!response.is_accepted());
    }

    #[test]
    fn error_body_becomes_rejection() {
        let body: ScanErrorBody =
            serde_json::from_str(r#"{"message": "Visitor already checked out"}"#).unwrap();
        let response = body.into_rejection().unwrap();
        assert_eq!(response.kind, TransitionKind::Rejected);
        assert_eq!(response.message.as_deref(), Some("Visitor already checked out"));
        assert!(response.visitor.is_none());
    }

    #[test]
    fn error_body_without_message_is_not_rejection() {
        assert!(ScanErrorBody::default().into_rejection().is_none());

        let body: ScanErrorBody = serde_json::from_str(r#"{"message": "  "}"#).unwrap();
        assert!(body.into_rejection().is_none());
    }
}
