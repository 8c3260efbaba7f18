use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a cube in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, for log lines and debug output.
    pub fn short(&self) -> String {
        let mut s = self.0.simple().to_string();
        s.truncate(8);
        s
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short())
    }
}

/// Axis a cube spins around. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RotationAxis {
    X,
    Y,
    Z,
}

impl RotationAxis {
    pub const ALL: [RotationAxis; 3] = [RotationAxis::X, RotationAxis::Y, RotationAxis::Z];

    /// Component index into a `Vec3`.
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    pub fn unit(self) -> Vec3 {
        match self {
            Self::X => Vec3::X,
            Self::Y => Vec3::Y,
            Self::Z => Vec3::Z,
        }
    }
}

/// Axis-aligned containment volume centred on the origin.
///
/// Each component of `half_extents` is the positive limit on that axis; the
/// negative limit mirrors it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub half_extents: Vec3,
}

impl Bounds {
    pub fn new(half_extents: Vec3) -> Self {
        Self { half_extents }
    }

    /// A square slab: `boundary` on X and Y, `boundary * depth_ratio` on Z.
    pub fn slab(boundary: f32, depth_ratio: f32) -> Self {
        Self::new(Vec3::new(boundary, boundary, boundary * depth_ratio))
    }

    /// Positive limit on the given axis (0 = X, 1 = Y, 2 = Z).
    pub fn limit(&self, axis: usize) -> f32 {
        self.half_extents[axis]
    }

    /// Whether a point lies inside the volume (limits inclusive).
    pub fn contains_point(&self, p: Vec3) -> bool {
        p.abs().cmple(self.half_extents).all()
    }

    /// Widest cube whose extent fits strictly inside on every axis.
    pub fn max_cube_size(&self) -> f32 {
        2.0 * self.half_extents.min_element()
    }

    /// Whether a cube of `size` fits with room to move on every axis.
    pub fn fits(&self, size: f32) -> bool {
        size.is_finite() && size > 0.0 && size < self.max_cube_size()
    }
}
