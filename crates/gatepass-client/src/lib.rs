//! HTTP client for the visitor API
//!
//! Endpoints, relative to the configured base URL:
//! - `GET api/visitors`: full roster, newest first
//! - `POST api/visitors`: register a visitor
//! - `GET api/visitors/stats`: registrations per day
//! - `POST api/visitors/scan`: check a visitor in or out

mod client;
mod error;

pub use client::*;
pub use error::*;
