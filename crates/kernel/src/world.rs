use cubefield_common::EntityId;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::boundary::contain_all;
use crate::collision::resolve_collisions;
use crate::config::{ConfigError, SimConfig};
use crate::cube::{Cube, CubeView};
use crate::graph::{Edge, ProximityGraph};
use crate::integrator::{integrate_all, limit_velocity};
use crate::spawn::{self, SplitResult, random_axis};
use crate::store::{EntityStore, StoreError};

/// An event record produced by every mutation of the simulation.
///
/// Observational only: hosts drain it for logging or UI feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// Cube entered the store.
    Spawned {
        id: EntityId,
        level: u32,
        size: f32,
        position: Vec3,
    },
    /// Cube left the store.
    Despawned { id: EntityId },
    /// Cube started a flash fade.
    Flashed { id: EntityId },
    /// A split removed `parent` and placed `children`.
    Split {
        parent: EntityId,
        children: Vec<EntityId>,
        requested: u32,
    },
    /// Simulation advanced one frame.
    Stepped { tick: u64, population: usize },
}

/// Why an interaction produced a flash but no children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlashReason {
    MaxLevel,
    Starved,
}

/// Result of a successful `interact` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractOutcome {
    Split {
        children: Vec<EntityId>,
        requested: u32,
    },
    FlashOnly(FlashReason),
}

/// Interactions that had no effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InteractError {
    #[error("no live cube {0}")]
    InvalidTarget(EntityId),
    #[error(transparent)]
    Store(StoreError),
}

/// Errors from building a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("cube of size {size} does not fit the volume (max {max})")]
    DoesNotFit { size: f32, max: f32 },
}

/// Per-frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub tick: u64,
    pub population: usize,
    pub contacts: usize,
    pub impulses: usize,
    pub bounces: usize,
    pub edges: usize,
}

/// What one `frame` call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReport {
    pub stats: StepStats,
    pub interaction: Option<Result<InteractOutcome, InteractError>>,
}

/// The authoritative simulation state.
///
/// Owns the entity store, the proximity graph and the RNG. Renderers only
/// read projections of it (`snapshot`, `edges`); every mutation goes through
/// `step`, `interact`, `insert` or `remove`.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    store: EntityStore,
    graph: ProximityGraph,
    rng: StdRng,
    seed: u64,
    tick: u64,
    /// Append-only event log of all mutations.
    event_log: Vec<SimEvent>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::build(SimConfig::default(), rand::random())
    }
}

impl Simulation {
    /// Empty simulation with an entropy-drawn seed.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        Self::with_seed(config, rand::random())
    }

    /// Empty simulation with a fixed seed, for reproducible runs.
    pub fn with_seed(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    /// The classic opening: three `root_size` roots around the origin.
    pub fn with_default_scene(config: SimConfig, seed: u64) -> Result<Self, SimError> {
        let size = config.root_size;
        let mut sim = Self::with_seed(config, seed)?;
        for position in [
            Vec3::new(-6.0, 0.0, 0.0),
            Vec3::new(6.0, 0.0, 0.0),
            Vec3::new(0.0, 6.0, 0.0),
        ] {
            sim.spawn_root(position, size)?;
        }
        Ok(sim)
    }

    fn build(config: SimConfig, seed: u64) -> Self {
        Self {
            config,
            store: EntityStore::new(),
            graph: ProximityGraph::new(),
            rng: StdRng::seed_from_u64(seed),
            seed,
            tick: 0,
            event_log: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Current frame number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Seed the RNG was started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn population(&self) -> usize {
        self.store.len()
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn get(&self, id: EntityId) -> Result<&Cube, StoreError> {
        self.store.get(id)
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SimEvent] {
        &self.event_log
    }

    /// Insert a level-0 cube with a small random drift and spin.
    pub fn spawn_root(&mut self, position: Vec3, size: f32) -> Result<EntityId, SimError> {
        let s = self.config.seed_speed;
        let drift = Vec3::new(
            self.rng.gen_range(-s..s),
            self.rng.gen_range(-s..s),
            self.rng.gen_range(-s..s),
        );
        let cube = Cube::new(
            position,
            limit_velocity(drift, self.config.max_velocity),
            size,
            0,
            random_axis(&mut self.rng),
            self.rng.gen_range(self.config.rotation_speed.clone()),
        );
        self.insert(cube)
    }

    /// Insert a fully specified cube. Cubes that cannot fit the volume on
    /// every axis are refused.
    pub fn insert(&mut self, cube: Cube) -> Result<EntityId, SimError> {
        let bounds = self.config.bounds();
        if !bounds.fits(cube.size) {
            return Err(SimError::DoesNotFit {
                size: cube.size,
                max: bounds.max_cube_size(),
            });
        }
        let event = spawned_event(&cube);
        let id = self.store.insert(cube)?;
        self.event_log.push(event);
        Ok(id)
    }

    /// Remove a cube. Returns it if it was present.
    pub fn remove(&mut self, id: EntityId) -> Option<Cube> {
        let cube = self.store.remove(id)?;
        self.event_log.push(SimEvent::Despawned { id });
        Some(cube)
    }

    /// Split `target`, or just flash it when it cannot split.
    pub fn interact(&mut self, target: EntityId) -> Result<InteractOutcome, InteractError> {
        let result = spawn::split(&mut self.store, target, &self.config, &mut self.rng)
            .map_err(|e| match e {
                StoreError::NotFound(id) => InteractError::InvalidTarget(id),
                other => InteractError::Store(other),
            })?;
        self.event_log.push(SimEvent::Flashed { id: target });

        let outcome = match result {
            SplitResult::Split {
                children,
                requested,
            } => {
                for id in &children {
                    if let Ok(child) = self.store.get(*id) {
                        let event = spawned_event(child);
                        self.event_log.push(event);
                        self.event_log.push(SimEvent::Flashed { id: *id });
                    }
                }
                self.event_log.push(SimEvent::Despawned { id: target });
                self.event_log.push(SimEvent::Split {
                    parent: target,
                    children: children.clone(),
                    requested,
                });
                InteractOutcome::Split {
                    children,
                    requested,
                }
            }
            SplitResult::MaxLevel => InteractOutcome::FlashOnly(FlashReason::MaxLevel),
            SplitResult::Starved { .. } => InteractOutcome::FlashOnly(FlashReason::Starved),
        };
        Ok(outcome)
    }

    /// Advance one frame: integrate, resolve contacts, contain, rebuild edges.
    pub fn step(&mut self) -> StepStats {
        let _span = tracing::trace_span!("sim_step", tick = self.tick + 1).entered();
        let config = &self.config;
        let cubes = self.store.all_mut();

        integrate_all(cubes, config);
        let contacts = resolve_collisions(cubes, config);
        let bounces = contain_all(cubes, &config.bounds(), config.max_velocity);
        self.graph.rebuild(self.store.all(), config.connection_radius);

        self.tick += 1;
        let stats = StepStats {
            tick: self.tick,
            population: self.store.len(),
            contacts: contacts.contacts,
            impulses: contacts.impulses,
            bounces,
            edges: self.graph.len(),
        };
        self.event_log.push(SimEvent::Stepped {
            tick: self.tick,
            population: stats.population,
        });
        tracing::trace!(?stats, "step complete");
        stats
    }

    /// One host frame: apply at most one resolved interaction, then step.
    pub fn frame(&mut self, interaction: Option<EntityId>) -> FrameReport {
        let interaction = interaction.map(|target| {
            let result = self.interact(target);
            if let Err(err) = &result {
                tracing::debug!(%err, "interaction ignored");
            }
            result
        });
        FrameReport {
            stats: self.step(),
            interaction,
        }
    }

    /// Read-only projection of every live cube, in store order.
    pub fn snapshot(&self) -> Vec<CubeView> {
        self.store.all().iter().map(CubeView::from).collect()
    }

    /// Proximity edges from the last step.
    pub fn edges(&self) -> &[Edge] {
        self.graph.edges()
    }

    /// Flat line-vertex buffer for the proximity edges.
    pub fn edge_positions(&self) -> &[f32] {
        self.graph.positions()
    }

    /// Deepest spawn level currently alive.
    pub fn deepest_level(&self) -> Option<u32> {
        self.store.all().iter().map(|c| c.level).max()
    }

    /// FNV-1a over the tick and every cube's kinematic state, in store order.
    /// Ids are left out so seeded runs compare equal.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.tick.to_le_bytes());
        for cube in self.store.all() {
            for v in cube.position.to_array().into_iter().chain(cube.velocity.to_array()) {
                mix(&mut h, &v.to_le_bytes());
            }
            mix(&mut h, &cube.size.to_le_bytes());
            mix(&mut h, &cube.level.to_le_bytes());
        }
        h
    }
}

fn spawned_event(cube: &Cube) -> SimEvent {
    SimEvent::Spawned {
        id: cube.id,
        level: cube.level,
        size: cube.size,
        position: cube.position,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubefield_common::RotationAxis;

    fn seeded(seed: u64) -> Simulation {
        Simulation::with_default_scene(SimConfig::default(), seed).unwrap()
    }

    #[test]
    fn simulation_starts_empty() {
        let sim = Simulation::with_seed(SimConfig::default(), 1).unwrap();
        assert_eq!(sim.tick(), 0);
        assert_eq!(sim.population(), 0);
        assert!(sim.edges().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SimConfig {
            max_spawn_attempts: 0,
            ..SimConfig::default()
        };
        assert!(Simulation::with_seed(config, 0).is_err());
    }

    #[test]
    fn default_scene_has_three_roots() {
        let sim = seeded(5);
        let snap = sim.snapshot();
        assert_eq!(snap.len(), 3);
        assert!(snap.iter().all(|c| c.level == 0 && c.size == 5.0));
        assert_eq!(snap[0].position, Vec3::new(-6.0, 0.0, 0.0));
        for cube in sim.store().all() {
            assert!(cube.velocity.length() <= sim.config().max_velocity);
        }
    }

    #[test]
    fn interacting_with_a_root_splits_it() {
        let mut sim = seeded(42);
        let target = sim.snapshot()[0].id;

        let children = match sim.interact(target).unwrap() {
            InteractOutcome::Split { children, .. } => children,
            other => panic!("expected a split, got {other:?}"),
        };
        assert!((2..=4).contains(&children.len()), "{} children", children.len());

        let snap = sim.snapshot();
        assert!(snap.iter().all(|c| c.id != target));
        assert_eq!(snap.len(), 2 + children.len());
        for id in &children {
            let child = sim.get(*id).unwrap();
            assert!((child.size - 3.5).abs() < 1e-5);
            assert_eq!(child.level, 1);
        }
    }

    #[test]
    fn interacting_with_missing_cube_has_no_effect() {
        let mut sim = seeded(1);
        let before = sim.state_hash();
        let ghost = EntityId::new();
        assert_eq!(
            sim.interact(ghost),
            Err(InteractError::InvalidTarget(ghost))
        );
        assert_eq!(sim.state_hash(), before);
        assert_eq!(sim.population(), 3);
    }

    #[test]
    fn deepest_cube_only_flashes() {
        let mut sim = Simulation::with_seed(SimConfig::default(), 9).unwrap();
        let deep = Cube::new(Vec3::ZERO, Vec3::ZERO, 1.0, 6, RotationAxis::Y, 0.002);
        let id = sim.insert(deep).unwrap();

        assert_eq!(
            sim.interact(id),
            Ok(InteractOutcome::FlashOnly(FlashReason::MaxLevel))
        );
        assert_eq!(sim.population(), 1);
        assert_eq!(sim.snapshot()[0].flash_intensity, 1.0);

        sim.step();
        let fading = sim.snapshot()[0].flash_intensity;
        assert!(fading < 1.0 && fading > 0.0);
    }

    #[test]
    fn head_on_pair_separates_after_one_step() {
        let mut sim = Simulation::with_seed(SimConfig::default(), 3).unwrap();
        let a = sim
            .insert(Cube::new(Vec3::new(-0.8, 0.0, 0.0), Vec3::new(0.1, 0.0, 0.0), 2.0, 0, RotationAxis::X, 0.002))
            .unwrap();
        let b = sim
            .insert(Cube::new(Vec3::new(0.8, 0.0, 0.0), Vec3::new(-0.1, 0.0, 0.0), 2.0, 0, RotationAxis::X, 0.002))
            .unwrap();

        let stats = sim.step();
        assert_eq!(stats.contacts, 1);
        assert_eq!(stats.impulses, 1);

        let (ca, cb) = (sim.get(a).unwrap(), sim.get(b).unwrap());
        let normal = (ca.position - cb.position).normalize();
        assert!((ca.velocity - cb.velocity).dot(normal) >= 0.0);
        assert!(ca.position.distance(cb.position) >= 2.0 - 1e-4);
    }

    #[test]
    fn invariants_hold_over_many_frames() {
        let mut sim = seeded(2024);
        let config = sim.config().clone();
        let bounds = config.bounds();

        for frame in 0..400u64 {
            let target = (frame % 7 == 0 && sim.population() > 0).then(|| {
                let snap = sim.snapshot();
                snap[(frame as usize / 7) % snap.len()].id
            });
            sim.frame(target);

            for cube in sim.store().all() {
                assert!(cube.level <= config.max_level);
                assert!(cube.size > 0.0);
                assert!(cube.velocity.length() <= config.max_velocity + 1e-3);
                for axis in 0..3 {
                    let limit = bounds.limit(axis);
                    assert!(cube.position[axis] + cube.half_size() <= limit + 1e-4);
                    assert!(cube.position[axis] - cube.half_size() >= -limit - 1e-4);
                }
            }

            let cubes = sim.store().all();
            let mut expected = 0;
            for i in 0..cubes.len() {
                for j in i + 1..cubes.len() {
                    let d2 = cubes[i].position.distance_squared(cubes[j].position);
                    expected += usize::from(d2 <= config.connection_radius * config.connection_radius);
                }
            }
            assert_eq!(sim.edges().len(), expected);
            assert!(sim.edges().iter().all(|e| e.a != e.b));
        }
        assert!(sim.population() > 3);
    }

    #[test]
    fn levels_grow_by_one_per_split() {
        let mut sim = seeded(11);
        let mut target = sim.snapshot()[0].id;
        for expected_level in 1..=3 {
            let parent_level = sim.get(target).unwrap().level;
            let children = match sim.interact(target) {
                Ok(InteractOutcome::Split { children, .. }) => children,
                other => panic!("expected a split at level {parent_level}, got {other:?}"),
            };
            for id in &children {
                assert_eq!(sim.get(*id).unwrap().level, parent_level + 1);
            }
            assert_eq!(parent_level + 1, expected_level);
            target = children[0];
        }
    }

    #[test]
    fn same_seed_same_trajectory() {
        let run = |seed| {
            let mut sim = seeded(seed);
            for frame in 0..120u64 {
                let target = (frame % 30 == 0).then(|| sim.snapshot()[0].id);
                sim.frame(target);
            }
            (sim.population(), sim.state_hash())
        };
        assert_eq!(run(77), run(77));
    }

    #[test]
    fn events_are_recorded() {
        let mut sim = seeded(4);
        // three roots
        assert_eq!(sim.events().len(), 3);
        sim.step();
        assert!(matches!(
            sim.events().last(),
            Some(SimEvent::Stepped { tick: 1, population: 3 })
        ));

        let target = sim.snapshot()[1].id;
        sim.drain_events();
        let children = match sim.interact(target) {
            Ok(InteractOutcome::Split { children, .. }) => children,
            other => panic!("expected a split, got {other:?}"),
        };
        let events = sim.drain_events();
        let spawned = events
            .iter()
            .filter(|e| matches!(e, SimEvent::Spawned { .. }))
            .count();
        assert_eq!(spawned, children.len());
        assert!(events.contains(&SimEvent::Despawned { id: target }));
        assert!(matches!(
            events.last(),
            Some(SimEvent::Split { parent, children: logged, .. })
                if *parent == target && *logged == children
        ));
        assert!(sim.events().is_empty());
    }

    #[test]
    fn frame_reports_ignored_interaction() {
        let mut sim = seeded(8);
        let ghost = EntityId::new();
        let report = sim.frame(Some(ghost));
        assert_eq!(report.stats.tick, 1);
        assert_eq!(report.stats.population, 3);
        assert_eq!(
            report.interaction,
            Some(Err(InteractError::InvalidTarget(ghost)))
        );
    }

    #[test]
    fn edge_buffer_matches_edges() {
        let mut sim = Simulation::with_seed(SimConfig::default(), 0).unwrap();
        sim.spawn_root(Vec3::new(0.0, 0.0, 0.0), 1.0).unwrap();
        sim.spawn_root(Vec3::new(3.0, 0.0, 0.0), 1.0).unwrap();
        sim.spawn_root(Vec3::new(15.0, 0.0, 0.0), 1.0).unwrap();
        sim.step();
        assert_eq!(sim.edges().len(), 1);
        assert_eq!(sim.edge_positions().len(), 6);
    }

    #[test]
    fn oversized_cube_is_refused() {
        let mut sim = Simulation::with_seed(SimConfig::default(), 6).unwrap();
        // The slab is 8 units deep on Z.
        let wide = Cube::new(Vec3::ZERO, Vec3::ZERO, 12.0, 0, RotationAxis::Z, 0.002);
        assert!(matches!(
            sim.insert(wide),
            Err(SimError::DoesNotFit { size, .. }) if size == 12.0
        ));
        assert!(matches!(
            sim.spawn_root(Vec3::ZERO, 8.0),
            Err(SimError::DoesNotFit { .. })
        ));
        assert_eq!(sim.population(), 0);
        assert!(sim.events().is_empty());
    }

    #[test]
    fn default_scene_uses_configured_root_size() {
        let config = SimConfig {
            root_size: 3.0,
            ..SimConfig::default()
        };
        let sim = Simulation::with_default_scene(config, 12).unwrap();
        assert!(sim.snapshot().iter().all(|c| c.size == 3.0));
    }
}
