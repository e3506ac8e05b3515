//! Visitor pass status engine for gatepass
//!
//! This crate is the heart of gatepass, containing:
//! - Status classification (Registered -> Active -> Not Active, Expired)
//! - The check-in / check-out transition contract
//! - Scan reconciliation against the returned record
//! - Read models for listing, reports and the dashboard
//!
//! Nothing here reads the clock. Every function that depends on time takes
//! `now` as a parameter.

mod dashboard;
mod engine;
mod listing;
mod report;
mod scan;
mod transition;

pub use dashboard::*;
pub use engine::*;
pub use listing::*;
pub use report::*;
pub use scan::*;
pub use transition::*;
