//! Rendering Adapter: the collaborator side of the simulation interface.
//!
//! # Invariants
//! - Renderers cannot mutate simulation state; they consume `snapshot()` and `edges()`.
//! - Picking resolves a pointer to at most one entity id; the kernel never ray-casts.

mod pick;
mod renderer;
mod view;

pub use pick::{Ray, ndc_from_pointer, pick, ray_aabb};
pub use renderer::{DebugTextRenderer, Renderer};
pub use view::RenderView;

pub fn crate_info() -> &'static str {
    "cubefield-render v0.1.0"
}
