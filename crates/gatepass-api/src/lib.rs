//! Record and wire types for gatepass
//!
//! This crate defines the data shapes exchanged with the visitor API and
//! shown to operators:
//! - Visitor pass records and their set-once check-in/check-out fields
//! - The computed pass status and its fixed display styling
//! - Scan request/response bodies
//! - The registration request body
//! - The QR payload printed on passes

mod qr;
mod register;
mod scan;
mod status;
mod types;

pub use qr::*;
pub use register::*;
pub use scan::*;
pub use status::*;
pub use types::*;
