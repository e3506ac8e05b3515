//! The gatepass operator console
//!
//! Wires configuration, the roster cache, the visitor API client and the
//! status engine into the commands behind the `gatepass` binary.

mod console;
mod render;

pub use console::*;
pub use render::*;
