//! Simulation kernel: authoritative cube state, per-frame stepping, fission.
//!
//! # Invariants
//! - The entity store is the only owner of cube data; renderers read projections.
//! - Store contents change only through insert and remove.
//! - One `step` runs integrate, collide, contain, then rebuilds the proximity graph.
//! - A split removes its target only if at least one child was placed.

pub mod boundary;
pub mod collision;
pub mod config;
pub mod cube;
pub mod graph;
pub mod integrator;
pub mod spawn;
pub mod store;
pub mod world;

pub use config::{ConfigError, SimConfig};
pub use cube::{Cube, CubeView, Flash};
pub use graph::{Edge, ProximityGraph};
pub use store::{EntityStore, StoreError};
pub use world::{
    FlashReason, FrameReport, InteractError, InteractOutcome, SimError, SimEvent, Simulation,
    StepStats,
};
