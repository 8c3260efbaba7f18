use cubefield_common::{EntityId, RotationAxis};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Transient emissive highlight, advanced once per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flash {
    remaining: u32,
    duration: u32,
}

impl Flash {
    /// Restart the fade at full intensity.
    pub fn trigger(&mut self, duration: u32) {
        self.remaining = duration;
        self.duration = duration;
    }

    /// Advance the fade by one frame.
    pub fn decay(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// 1.0 right after a trigger, falling linearly to 0.0.
    pub fn intensity(&self) -> f32 {
        if self.duration == 0 {
            0.0
        } else {
            self.remaining as f32 / self.duration as f32
        }
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }
}

/// The single simulated entity: a point mass with a cubical extent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cube {
    pub id: EntityId,
    pub position: Vec3,
    pub velocity: Vec3,
    /// Edge length. Contact radius is `size / 2`.
    pub size: f32,
    /// Depth in the spawn tree; 0 for seed cubes.
    pub level: u32,
    pub rotation_axis: RotationAxis,
    pub rotation_speed: f32,
    /// Euler angles for the renderer; physics never reads them.
    pub rotation: Vec3,
    pub flash: Flash,
}

impl Cube {
    pub fn new(
        position: Vec3,
        velocity: Vec3,
        size: f32,
        level: u32,
        rotation_axis: RotationAxis,
        rotation_speed: f32,
    ) -> Self {
        debug_assert!(size > 0.0, "cube size must be positive");
        Self {
            id: EntityId::new(),
            position,
            velocity,
            size,
            level,
            rotation_axis,
            rotation_speed,
            rotation: Vec3::ZERO,
            flash: Flash::default(),
        }
    }

    pub fn half_size(&self) -> f32 {
        self.size * 0.5
    }

    /// Angle around the cube's own rotation axis.
    pub fn rotation_angle(&self) -> f32 {
        self.rotation[self.rotation_axis.index()]
    }
}

/// Read-only projection of a cube for draw-call generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubeView {
    pub id: EntityId,
    pub position: Vec3,
    pub size: f32,
    pub level: u32,
    pub rotation_axis: RotationAxis,
    pub rotation_angle: f32,
    pub flash_intensity: f32,
}

impl From<&Cube> for CubeView {
    fn from(cube: &Cube) -> Self {
        Self {
            id: cube.id,
            position: cube.position,
            size: cube.size,
            level: cube.level,
            rotation_axis: cube.rotation_axis,
            rotation_angle: cube.rotation_angle(),
            flash_intensity: cube.flash.intensity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flash_fades_linearly() {
        let mut flash = Flash::default();
        assert_eq!(flash.intensity(), 0.0);

        flash.trigger(4);
        assert_eq!(flash.intensity(), 1.0);
        flash.decay();
        assert_eq!(flash.intensity(), 0.75);
        for _ in 0..10 {
            flash.decay();
        }
        assert_eq!(flash.intensity(), 0.0);
        assert!(!flash.is_active());
    }

    #[test]
    fn retrigger_restores_full_intensity() {
        let mut flash = Flash::default();
        flash.trigger(10);
        flash.decay();
        flash.decay();
        flash.trigger(10);
        assert_eq!(flash.intensity(), 1.0);
    }

    #[test]
    fn view_reports_angle_on_own_axis() {
        let mut cube = Cube::new(Vec3::ZERO, Vec3::ZERO, 2.0, 1, RotationAxis::Y, 0.01);
        cube.rotation = Vec3::new(0.1, 0.2, 0.3);
        let view = CubeView::from(&cube);
        assert_eq!(view.rotation_angle, 0.2);
        assert_eq!(view.level, 1);
        assert_eq!(view.size, 2.0);
    }
}
