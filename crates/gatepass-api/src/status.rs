//! Computed pass status and its display styling

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The time-relative status shown to operators.
///
/// Closed set. Produced only by classification, never read from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PassStatus {
    /// Checked in, not yet checked out, window still open
    Active,
    /// Checked in and out, window still open
    #[serde(rename = "Not Active")]
    NotActive,
    /// Validity window has lapsed
    Expired,
    /// Never checked in, window still open
    Registered,
}

impl PassStatus {
    pub const ALL: [PassStatus; 4] = [
        PassStatus::Active,
        PassStatus::NotActive,
        PassStatus::Expired,
        PassStatus::Registered,
    ];

    /// Operator-facing label, verbatim
    pub fn label(&self) -> &'static str {
        match self {
            PassStatus::Active => "Active",
            PassStatus::NotActive => "Not Active",
            PassStatus::Expired => "Expired",
            PassStatus::Registered => "Registered",
        }
    }

    pub fn style(&self) -> StatusStyle {
        match self {
            PassStatus::Active => StatusStyle {
                tone: Tone::Affirmative,
                pulsing: true,
                color: "#10b981",
            },
            PassStatus::NotActive => StatusStyle {
                tone: Tone::Neutral,
                pulsing: false,
                color: "#94a3b8",
            },
            PassStatus::Expired => StatusStyle {
                tone: Tone::Negative,
                pulsing: false,
                color: "#ef4444",
            },
            PassStatus::Registered => StatusStyle {
                tone: Tone::Informational,
                pulsing: false,
                color: "#3b82f6",
            },
        }
    }
}

impl fmt::Display for PassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error parsing a status label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown pass status label: {0}")]
pub struct UnknownStatusLabel(pub String);

impl FromStr for PassStatus {
    type Err = UnknownStatusLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PassStatus::ALL
            .into_iter()
            .find(|status| status.label() == s)
            .ok_or_else(|| UnknownStatusLabel(s.to_string()))
    }
}

/// Semantic tone of a status badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Affirmative,
    Neutral,
    Negative,
    Informational,
}

/// Fixed badge styling for a status, identical on every screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusStyle {
    pub tone: Tone,
    /// Animated marker, used only for visitors currently on campus
    pub pulsing: bool,
    /// Hex color for charts and badges
    pub color: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_operator_vocabulary() {
        let labels: Vec<_> = PassStatus::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels, ["Active", "Not Active", "Expired", "Registered"]);
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&PassStatus::NotActive).unwrap();
        assert_eq!(json, "\"Not Active\"");
        let parsed: PassStatus = serde_json::from_str("\"Expired\"").unwrap();
        assert_eq!(parsed, PassStatus::Expired);
    }

    #[test]
    fn label_round_trip_through_from_str() {
        for status in PassStatus::ALL {
            assert_eq!(status.label().parse::<PassStatus>(), Ok(status));
        }
        assert!("Checked Out".parse::<PassStatus>().is_err());
    }

    #[test]
    fn display_mapping_is_fixed() {
        assert_eq!(PassStatus::Active.style().tone, Tone::Affirmative);
        assert!(PassStatus::Active.style().pulsing);
        assert_eq!(PassStatus::NotActive.style().tone, Tone::Neutral);
        assert_eq!(PassStatus::Expired.style().tone, Tone::Negative);
        assert_eq!(PassStatus::Registered.style().tone, Tone::Informational);

        let pulsing: Vec<_> = PassStatus::ALL
            .into_iter()
            .filter(|s| s.style().pulsing)
            .collect();
        assert_eq!(pulsing, [PassStatus::Active]);
    }
}
