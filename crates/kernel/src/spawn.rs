//! Fission: replace a target cube with smaller children placed around it.
//!
//! Child directions come from independent `theta ∈ [0, 2π)` and
//! `phi ∈ [0, π)` draws. That distribution is not area-uniform on the sphere
//! (it bunches toward the poles); it is kept as-is for behavioural parity.

use std::f32::consts::{PI, TAU};

use cubefield_common::{Bounds, EntityId, RotationAxis};
use glam::Vec3;
use rand::Rng;

use crate::config::SimConfig;
use crate::cube::Cube;
use crate::integrator::limit_velocity;
use crate::store::{EntityStore, StoreError};

/// What a split attempt did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitResult {
    /// At least one child was placed and the target was removed.
    Split {
        children: Vec<EntityId>,
        requested: u32,
    },
    /// Target is at the deepest level; it flashed and stays.
    MaxLevel,
    /// No child found a free slot; the target flashed and stays.
    Starved { requested: u32 },
}

/// Unit direction from spherical angles.
pub fn spherical_direction(theta: f32, phi: f32) -> Vec3 {
    Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos()).normalize_or_zero()
}

pub fn random_axis<R: Rng + ?Sized>(rng: &mut R) -> RotationAxis {
    RotationAxis::ALL[rng.gen_range(0..RotationAxis::ALL.len())]
}

/// A candidate spawn point is usable if it is inside the volume and clear of
/// every existing cube by `min_spawn_distance + clearance * other.size`.
pub fn is_position_valid<'a>(
    position: Vec3,
    cubes: impl IntoIterator<Item = &'a Cube>,
    bounds: &Bounds,
    config: &SimConfig,
) -> bool {
    if !bounds.contains_point(position) {
        return false;
    }
    cubes.into_iter().all(|other| {
        position.distance(other.position)
            >= config.min_spawn_distance + other.size * config.spawn_clearance_factor
    })
}

/// Search for a free slot near `origin + direction(theta, phi) * distance`.
///
/// Attempt `k` turns both angles by `k * retry_angle_step` and stretches the
/// distance by `1 + k * retry_distance_step`, so candidates drift outward
/// from the first pick instead of jumping around.
pub fn find_placement<'a>(
    origin: Vec3,
    theta: f32,
    phi: f32,
    distance: f32,
    cubes: impl IntoIterator<Item = &'a Cube> + Clone,
    bounds: &Bounds,
    config: &SimConfig,
) -> Option<Vec3> {
    (0..config.max_spawn_attempts)
        .map(|k| {
            let k = k as f32;
            let offset = k * config.retry_angle_step;
            let reach = distance * (1.0 + k * config.retry_distance_step);
            origin + spherical_direction(theta + offset, phi + offset) * reach
        })
        .find(|candidate| is_position_valid(*candidate, cubes.clone(), bounds, config))
}

/// Split `target` into children. The target is flashed in every case and is
/// removed only if at least one child was placed. Children are placed against
/// the store plus earlier siblings, then inserted together.
pub fn split<R: Rng + ?Sized>(
    store: &mut EntityStore,
    target: EntityId,
    config: &SimConfig,
    rng: &mut R,
) -> Result<SplitResult, StoreError> {
    let parent = store.get_mut(target)?;
    parent.flash.trigger(config.flash_frames);
    if parent.level >= config.max_level {
        return Ok(SplitResult::MaxLevel);
    }
    let origin = parent.position;
    let child_size = parent.size * config.shrink_factor;
    let child_level = parent.level + 1;

    let bounds = config.bounds();
    let requested = rng.gen_range(config.spawn_count.clone());
    let base_distance = child_size * config.spawn_offset_factor;
    let mut placed: Vec<Cube> = Vec::with_capacity(requested as usize);

    for _ in 0..requested {
        let theta = rng.r#gen::<f32>() * TAU;
        let phi = rng.r#gen::<f32>() * PI;
        let distance = base_distance + rng.r#gen::<f32>() * base_distance * config.spawn_distance_jitter;

        let Some(position) =
            find_placement(origin, theta, phi, distance, store.all().iter().chain(&placed), &bounds, config)
        else {
            tracing::debug!(%target, child_level, "no free slot for child, skipping");
            continue;
        };

        let speed = rng.gen_range(config.initial_speed.clone());
        let velocity = limit_velocity(spherical_direction(theta, phi) * speed, config.max_velocity);
        let mut child = Cube::new(
            position,
            velocity,
            child_size,
            child_level,
            random_axis(rng),
            rng.gen_range(config.rotation_speed.clone()),
        );
        child.flash.trigger(config.flash_frames);
        placed.push(child);
    }

    if placed.is_empty() {
        tracing::debug!(%target, requested, "split starved, target kept");
        return Ok(SplitResult::Starved { requested });
    }

    let children = store.insert_batch(placed)?;
    store.remove(target);
    tracing::debug!(%target, placed = children.len(), requested, child_level, "split");
    Ok(SplitResult::Split {
        children,
        requested,
    })
}
