//! Pairwise contact between cubes, each treated as a sphere of radius `size / 2`.

use glam::Vec3;

use crate::config::SimConfig;
use crate::cube::Cube;
use crate::integrator::limit_velocity;

/// Contact normal used when two centres coincide.
pub const DEGENERATE_NORMAL: Vec3 = Vec3::X;

/// Counts from one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    /// Overlapping pairs found.
    pub contacts: usize,
    /// Contacts that were closing and received an impulse.
    pub impulses: usize,
    /// Contacts with coincident centres, resolved along [`DEGENERATE_NORMAL`].
    pub degenerate: usize,
}

/// Resolve one pair. Returns `None` when they do not overlap, otherwise
/// whether an impulse was applied and whether the normal was degenerate.
pub fn resolve_pair(a: &mut Cube, b: &mut Cube, config: &SimConfig) -> Option<(bool, bool)> {
    let delta = a.position - b.position;
    let distance = delta.length();
    let min_distance = (a.size + b.size) * 0.5;
    if distance >= min_distance {
        return None;
    }

    let degenerate = distance <= f32::EPSILON;
    let normal = if degenerate {
        DEGENERATE_NORMAL
    } else {
        delta / distance
    };

    let correction = normal * ((min_distance - distance) * 0.5);
    a.position += correction;
    b.position -= correction;

    let approach_speed = (a.velocity - b.velocity).dot(normal);
    if approach_speed >= 0.0 {
        return Some((false, degenerate));
    }

    let impulse = normal * (-approach_speed * config.restitution_boost);
    a.velocity = limit_velocity(a.velocity + impulse, config.max_velocity);
    b.velocity = limit_velocity(b.velocity - impulse, config.max_velocity);
    Some((true, degenerate))
}

/// Resolve every unordered pair, in store order.
pub fn resolve_collisions(cubes: &mut [Cube], config: &SimConfig) -> CollisionStats {
    let mut stats = CollisionStats::default();
    for i in 0..cubes.len() {
        let (head, tail) = cubes.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            if let Some((impulse, degenerate)) = resolve_pair(a, b, config) {
                stats.contacts += 1;
                stats.impulses += usize::from(impulse);
                if degenerate {
                    tracing::debug!(a = %a.id, b = %b.id, "coincident centres, using fallback normal");
                    stats.degenerate += 1;
                }
            }
        }
    }
    stats
}
