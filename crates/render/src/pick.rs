use cubefield_common::EntityId;
use cubefield_kernel::CubeView;
use glam::{Vec2, Vec3};

/// A world-space ray with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Pointer pixel coordinates to NDC (`y` up).
pub fn ndc_from_pointer(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new((x / width) * 2.0 - 1.0, -(y / height) * 2.0 + 1.0)
}

/// Slab test against an axis-aligned box. Returns the entry distance, or the
/// exit distance when the origin is inside.
pub fn ray_aabb(ray: &Ray, center: Vec3, half_extent: f32) -> Option<f32> {
    let inv = ray.direction.recip();
    let t0 = (center - Vec3::splat(half_extent) - ray.origin) * inv;
    let t1 = (center + Vec3::splat(half_extent) - ray.origin) * inv;
    let t_near = t0.min(t1).max_element();
    let t_far = t0.max(t1).min_element();
    if t_near.is_nan() || t_far.is_nan() || t_far < 0.0 || t_near > t_far {
        return None;
    }
    Some(if t_near >= 0.0 { t_near } else { t_far })
}

/// Nearest cube under the ray.
///
/// Bounds are axis-aligned and ignore the cube's spin, matching the kernel's
/// contact model rather than the drawn mesh.
pub fn pick(cubes: &[CubeView], ray: &Ray) -> Option<EntityId> {
    let hit = cubes
        .iter()
        .filter_map(|c| ray_aabb(ray, c.position, c.size * 0.5).map(|t| (t, c.id)))
        .min_by(|a, b| a.0.total_cmp(&b.0));
    if let Some((t, id)) = hit {
        tracing::trace!(%id, t, "picked");
    }
    hit.map(|(_, id)| id)
}
