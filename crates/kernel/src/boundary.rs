use cubefield_common::Bounds;

use crate::cube::Cube;
use crate::integrator::limit_velocity;

/// Keep a cube's extent inside `bounds`, reflecting velocity on contact.
/// Returns the number of faces it bounced off.
///
/// A cube at least as wide as the volume on some axis cannot fit there; it is
/// centred on that axis and reflected once when it is moving off centre.
pub fn contain(cube: &mut Cube, bounds: &Bounds, max_velocity: f32) -> usize {
    let half = cube.half_size();
    let mut bounces = 0;
    for axis in 0..3 {
        let limit = bounds.limit(axis);
        if half >= limit {
            let offset = cube.position[axis];
            cube.position[axis] = 0.0;
            if offset != 0.0 && offset.signum() == cube.velocity[axis].signum() {
                cube.velocity[axis] = -cube.velocity[axis];
                cube.velocity = limit_velocity(cube.velocity, max_velocity);
                bounces += 1;
            }
            continue;
        }
        if cube.position[axis] + half > limit {
            cube.position[axis] = limit - half;
            cube.velocity[axis] = -cube.velocity[axis];
            cube.velocity = limit_velocity(cube.velocity, max_velocity);
            bounces += 1;
        }
        if cube.position[axis] - half < -limit {
            cube.position[axis] = -limit + half;
            cube.velocity[axis] = -cube.velocity[axis];
            cube.velocity = limit_velocity(cube.velocity, max_velocity);
            bounces += 1;
        }
    }
    bounces
}

pub fn contain_all(cubes: &mut [Cube], bounds: &Bounds, max_velocity: f32) -> usize {
    cubes
        .iter_mut()
        .map(|cube| contain(cube, bounds, max_velocity))
        .sum()
}
