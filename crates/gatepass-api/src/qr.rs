//! QR payload printed on passes
//!
//! Passes carry a JSON object describing the visitor. Older printouts and
//! hand-typed codes carry just the pass id, so decoding falls back to the raw
//! text when it is not a JSON object.

use chrono::{DateTime, Utc};
use gatepass_util::{lenient_timestamp, GatepassError, PassId};
use serde::{Deserialize, Serialize};

use crate::{VisitorPass, VisitorType};

/// The JSON object embedded in a pass's QR code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
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
    #[serde(default, with = "lenient_timestamp")]
    pub valid_until: Option<DateTime<Utc>>,
}

impl QrPayload {
    pub fn from_pass(pass: &VisitorPass) -> Self {
        Self {
            pass_id: pass.pass_id.clone(),
            full_name: pass.full_name.clone(),
            phone: pass.phone.clone(),
            visitor_type: pass.visitor_type,
            purpose: pass.purpose.clone(),
            host_name: pass.host_name.clone(),
            valid_until: pass.valid_until,
        }
    }

    /// Text to encode into the QR image
    pub fn to_json(&self) -> Result<String, GatepassError> {
        serde_json::to_string(self).map_err(|e| GatepassError::internal(e.to_string()))
    }
}

/// Extract the pass id from scanned QR text.
pub fn decode_scan(raw: &str) -> Result<PassId, GatepassError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(GatepassError::invalid_qr("empty scan"));
    }

    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::Object(map)) => match map.get("passId") {
            Some(serde_json::Value::String(id)) if !id.trim().is_empty() => {
                Ok(PassId::new(id.trim()))
            }
            _ => Err(GatepassError::invalid_qr("payload has no passId")),
        },
        // Not a JSON object: the code is the id itself
        _ => Ok(PassId::new(text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn decodes_json_payload() {
        let raw = r#"{"passId":"VIS-1042","fullName":"Asha Rao","visitorType":"oneday"}"#;
        assert_eq!(decode_scan(raw).unwrap(), PassId::new("VIS-1042"));
    }

    #[test]
    fn decodes_bare_id() {
        assert_eq!(decode_scan("  VIS-77 \n").unwrap(), PassId::new("VIS-77"));
        assert_eq!(decode_scan("1042").unwrap(), PassId::new("1042"));
    }

    #[test]
    fn rejects_empty_and_idless_payloads() {
        assert!(matches!(decode_scan(""), Err(GatepassError::InvalidQr(_))));
        assert!(matches!(decode_scan("   "), Err(GatepassError::InvalidQr(_))));
        assert!(matches!(
            decode_scan(r#"{"fullName":"No Id"}"#),
            Err(GatepassError::InvalidQr(_))
        ));
        assert!(matches!(
            decode_scan(r#"{"passId":""}"#),
            Err(GatepassError::InvalidQr(_))
        ));
    }

    #[test]
    fn payload_from_pass_decodes_back_to_its_id() {
        let pass = VisitorPass::new("VIS-5", "Guest")
            .with_host("Dr. Menon", "Seminar")
            .with_valid_until(Utc.with_ymd_and_hms(2025, 1, 22, 0, 0, 0).unwrap());

        let json = QrPayload::from_pass(&pass).to_json().unwrap();
        assert!(json.contains("\"hostName\":\"Dr. Menon\""));
        assert_eq!(decode_scan(&json).unwrap(), pass.pass_id);
    }
}
