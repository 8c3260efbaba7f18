//! Developer Tooling: read-only simulation inspector.
//!
//! # Invariants
//! - Tools only read simulation state.

pub mod inspector;

pub use inspector::{EntityInfo, SimInspector, SimSummary};

pub fn crate_info() -> &'static str {
    "cubefield-tools v0.1.0"
}
