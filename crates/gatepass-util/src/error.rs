//! Error types for gatepass

use thiserror::Error;

/// Core error type for gatepass operations that cross the remote API boundary
#[derive(Debug, Error)]
pub enum GatepassError {
    #[error("Invalid QR payload: {0}")]
    InvalidQr(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Store error: {0}")]
    StoreError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatepassError {
    pub fn invalid_qr(msg: impl Into<String>) -> Self {
        Self::InvalidQr(msg.into())
    }

    pub fn api(status: u16, msg: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: msg.into(),
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether an operator can simply retry (network hiccups, timeouts,
    /// throttling, server errors)
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Api { status, .. } => *status >= 500 || matches!(*status, 408 | 429),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, GatepassError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(GatepassError::transport("connection reset").is_retryable());
        assert!(GatepassError::api(503, "unavailable").is_retryable());
        assert!(!GatepassError::api(404, "no such pass").is_retryable());
        assert!(!GatepassError::invalid_qr("empty").is_retryable());
    }

    #[test]
    fn timeout_and_throttling_are_retryable() {
        assert!(GatepassError::api(408, "Request Timeout").is_retryable());
        assert!(GatepassError::api(429, "Too Many Requests").is_retryable());
        assert!(!GatepassError::api(400, "Bad Request").is_retryable());
        assert!(!GatepassError::api(499, "client closed").is_retryable());
    }

    #[test]
    fn display_includes_status() {
        let err = GatepassError::api(409, "Already checked out");
        assert_eq!(err.to_string(), "API error (409): Already checked out");
    }
}
