//! Per-cube motion update: unit-step advance, damping, speed limits, spin.
//!
//! The step size is exactly one call; there is no `dt` scaling.

use glam::Vec3;

use crate::config::SimConfig;
use crate::cube::Cube;

/// Rescale `velocity` to `max` if it is faster, preserving direction.
pub fn limit_velocity(velocity: Vec3, max: f32) -> Vec3 {
    if velocity.length_squared() > max * max {
        velocity.normalize_or_zero() * max
    } else {
        velocity
    }
}

/// Raise every component whose magnitude is below `min` to exactly `min`,
/// keeping its sign. Zero counts as positive.
pub fn enforce_min_speed(velocity: Vec3, min: f32) -> Vec3 {
    let floor = |v: f32| {
        if v.abs() >= min {
            v
        } else if v < 0.0 {
            -min
        } else {
            min
        }
    };
    Vec3::new(floor(velocity.x), floor(velocity.y), floor(velocity.z))
}

/// Advance one cube by one step.
pub fn integrate(cube: &mut Cube, config: &SimConfig) {
    cube.position += cube.velocity;
    cube.velocity *= config.damping;
    cube.velocity = limit_velocity(cube.velocity, config.max_velocity);
    cube.velocity = enforce_min_speed(cube.velocity, config.min_velocity);

    cube.rotation[cube.rotation_axis.index()] += cube.rotation_speed;
    cube.flash.decay();
}

pub fn integrate_all(cubes: &mut [Cube], config: &SimConfig) {
    for cube in cubes {
        integrate(cube, config);
    }
}
