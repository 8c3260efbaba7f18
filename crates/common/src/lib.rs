//! Shared types for the cubefield simulation.
//!
//! # Invariants
//! - `EntityId`s are never reused within a process.
//! - `Bounds` is symmetric about the origin on every axis.

pub mod types;

pub use types::{Bounds, EntityId, RotationAxis};
