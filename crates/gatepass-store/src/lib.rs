//! Persistence layer for gatepass
//!
//! Provides:
//! - Roster cache (the last pass records fetched from the visitor API)
//! - Audit log of syncs and scans (append-only)
//!
//! Only records are cached. Statuses are recomputed on every read.

mod audit;
mod sqlite;
mod traits;

pub use audit::*;
pub use sqlite::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

impl From<StoreError> for gatepass_util::GatepassError {
    fn from(e: StoreError) -> Self {
        gatepass_util::GatepassError::store(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
