use cubefield_kernel::Simulation;

use crate::view::RenderView;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads a simulation and a view, then produces output. It
/// never mutates the simulation.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given simulation state and view.
    fn render(&self, sim: &Simulation, view: &RenderView) -> Self::Output;
}

/// Text renderer for headless hosts, logs and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Also list every proximity edge.
    pub show_edges: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edges() -> Self {
        Self { show_edges: true }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, sim: &Simulation, view: &RenderView) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Cubefield (tick={}, seed={}) ===\n",
            sim.tick(),
            sim.seed()
        ));
        out.push_str(&format!(
            "Cubes: {}  Edges: {}\n",
            sim.population(),
            sim.edges().len()
        ));
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}\n",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees
        ));

        for cube in sim.snapshot() {
            let p = cube.position;
            out.push_str(&format!(
                "  [{}] L{} size={:.2} pos=({:.2}, {:.2}, {:.2}) spin={:?}:{:.2}",
                cube.id, cube.level, cube.size, p.x, p.y, p.z, cube.rotation_axis, cube.rotation_angle
            ));
            if cube.flash_intensity > 0.0 {
                out.push_str(&format!(" flash={:.2}", cube.flash_intensity));
            }
            out.push('\n');
        }

        if self.show_edges {
            for edge in sim.edges() {
                out.push_str(&format!("  {} -- {}\n", edge.a, edge.b));
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubefield_kernel::SimConfig;
    use glam::Vec3;

    #[test]
    fn debug_renderer_empty_simulation() {
        let sim = Simulation::with_seed(SimConfig::default(), 0).unwrap();
        let output = DebugTextRenderer::new().render(&sim, &RenderView::default());

        assert!(output.contains("tick=0"));
        assert!(output.contains("Cubes: 0"));
    }

    #[test]
    fn debug_renderer_lists_cubes_and_flash() {
        let mut sim = Simulation::with_default_scene(SimConfig::default(), 12).unwrap();
        let target = sim.snapshot()[0].id;
        let _ = sim.interact(target);
        sim.step();

        let output = DebugTextRenderer::new().render(&sim, &RenderView::default());
        assert!(output.contains(&format!("Cubes: {}", sim.population())));
        assert!(output.contains("pos="));
        assert!(output.contains("flash="));
    }

    #[test]
    fn debug_renderer_lists_edges_on_request() {
        let mut sim = Simulation::with_seed(SimConfig::default(), 0).unwrap();
        let a = sim.spawn_root(Vec3::ZERO, 1.0).unwrap();
        sim.spawn_root(Vec3::new(2.0, 0.0, 0.0), 1.0).unwrap();
        sim.step();

        let output = DebugTextRenderer::with_edges().render(&sim, &RenderView::default());
        assert!(output.contains("Edges: 1"));
        assert!(output.contains(&format!("{a} --")) || output.contains(&format!("-- {a}")));
    }
}
