use cubefield_common::{EntityId, RotationAxis};
use cubefield_kernel::Simulation;

/// Read-only queries against a simulation for debugging and host UIs.
pub struct SimInspector;

impl SimInspector {
    /// Produce a summary of the simulation state.
    pub fn summary(sim: &Simulation) -> SimSummary {
        SimSummary {
            tick: sim.tick(),
            seed: sim.seed(),
            population: sim.population(),
            edges: sim.edges().len(),
            deepest_level: sim.deepest_level(),
            pending_events: sim.events().len(),
        }
    }

    /// Details of a single cube, if it is alive.
    pub fn inspect_entity(sim: &Simulation, id: EntityId) -> Option<EntityInfo> {
        sim.get(id).ok().map(|cube| EntityInfo {
            id,
            position: cube.position.to_array(),
            velocity: cube.velocity.to_array(),
            speed: cube.velocity.length(),
            size: cube.size,
            level: cube.level,
            rotation_axis: cube.rotation_axis,
            flash: cube.flash.intensity(),
        })
    }

    /// Number of live cubes at each level, indexed by level, up to `max_level`.
    pub fn level_histogram(sim: &Simulation) -> Vec<usize> {
        let mut counts = vec![0; sim.config().max_level as usize + 1];
        for cube in sim.store().all() {
            if let Some(slot) = counts.get_mut(cube.level as usize) {
                *slot += 1;
            }
        }
        counts
    }

    /// List all live ids in store order.
    pub fn list_entities(sim: &Simulation) -> Vec<EntityId> {
        sim.store().all().iter().map(|c| c.id).collect()
    }
}

/// Summary of simulation state for the inspector.
#[derive(Debug, Clone)]
pub struct SimSummary {
    pub tick: u64,
    pub seed: u64,
    pub population: usize,
    pub edges: usize,
    pub deepest_level: Option<u32>,
    pub pending_events: usize,
}

impl std::fmt::Display for SimSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Simulation: tick={} seed={} cubes={} edges={} deepest={} pending_events={}",
            self.tick,
            self.seed,
            self.population,
            self.edges,
            self.deepest_level
                .map_or_else(|| "-".to_string(), |l| l.to_string()),
            self.pending_events
        )
    }
}

/// Detailed info about a single cube.
#[derive(Debug, Clone)]
pub struct EntityInfo {
    pub id: EntityId,
    pub position: [f32; 3],
    pub velocity: [f32; 3],
    pub speed: f32,
    pub size: f32,
    pub level: u32,
    pub rotation_axis: RotationAxis,
    pub flash: f32,
}

impl std::fmt::Display for EntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cube [{}] L{} size={:.2} pos=({:.2}, {:.2}, {:.2}) speed={:.3} axis={:?}",
            self.id,
            self.level,
            self.size,
            self.position[0],
            self.position[1],
            self.position[2],
            self.speed,
            self.rotation_axis,
        )
    }
}
