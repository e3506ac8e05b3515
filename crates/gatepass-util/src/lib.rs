//! Shared utilities for gatepass
//!
//! This crate provides:
//! - ID types (PassId, ScanId)
//! - Clock access with a debug-only mock time override
//! - Lenient timestamp parsing for records coming from the visitor API
//! - Error types
//! - Default paths for config and data directories

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
