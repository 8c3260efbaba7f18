use serde::{Deserialize, Serialize};
use std::ops::{Range, RangeInclusive};
use std::path::Path;

/// Largest `spawn_count` upper bound accepted by [`SimConfig::validate`].
pub const MAX_SPAWN_COUNT: u32 = 64;

/// Errors from loading or validating a [`SimConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("`{field}` must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },
    #[error("`{field}` must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("`{field}` is an empty range")]
    EmptyRange { field: &'static str },
    #[error("min_velocity ({min}) must be below max_velocity ({max})")]
    VelocityBounds { min: f32, max: f32 },
    #[error("shrink_factor must lie in (0, 1), got {0}")]
    ShrinkFactor(f32),
    #[error("spawn_count may not exceed {limit}, got {max}")]
    SpawnCountTooLarge { max: u32, limit: u32 },
    #[error("max_spawn_attempts must be at least 1")]
    NoSpawnAttempts,
    #[error("root_size {size} does not fit the volume (max {max})")]
    RootTooLarge { size: f32, max: f32 },
}

/// Simulation tunables. `Default` reproduces the classic scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Deepest spawn level that may still be produced by a split.
    pub max_level: u32,
    /// Half-extent of the containment volume on X and Y.
    pub boundary: f32,
    /// Z half-extent as a fraction of `boundary`.
    pub depth_ratio: f32,
    /// Cubes closer than this are joined in the proximity graph.
    pub connection_radius: f32,
    pub min_velocity: f32,
    pub max_velocity: f32,
    /// Per-step velocity multiplier.
    pub damping: f32,
    /// Multiplier on the collision impulse; slightly above 1 to avoid sticking.
    pub restitution_boost: f32,
    /// Child edge length as a fraction of the parent's.
    pub shrink_factor: f32,
    pub spawn_count: RangeInclusive<u32>,
    /// Base spawn distance as a multiple of the child size.
    pub spawn_offset_factor: f32,
    /// Spawn distance is drawn from `[base, base * (1 + jitter))`.
    pub spawn_distance_jitter: f32,
    pub min_spawn_distance: f32,
    /// Fraction of a neighbour's size added to `min_spawn_distance`.
    pub spawn_clearance_factor: f32,
    pub max_spawn_attempts: u32,
    pub retry_distance_step: f32,
    /// Radians added to both spherical angles per retry.
    pub retry_angle_step: f32,
    pub initial_speed: Range<f32>,
    /// Seed cubes draw each velocity component from `±seed_speed`.
    pub seed_speed: f32,
    pub rotation_speed: Range<f32>,
    /// Frames a flash takes to fade out.
    pub flash_frames: u32,
    /// Edge length of the cubes in the default scene.
    pub root_size: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_level: 6,
            boundary: 20.0,
            depth_ratio: 0.2,
            connection_radius: 5.0,
            min_velocity: 0.005,
            max_velocity: 0.2,
            damping: 0.98,
            restitution_boost: 1.05,
            shrink_factor: 0.7,
            spawn_count: 2..=4,
            spawn_offset_factor: 1.2,
            spawn_distance_jitter: 0.5,
            min_spawn_distance: 1.5,
            spawn_clearance_factor: 0.4,
            max_spawn_attempts: 20,
            retry_distance_step: 0.1,
            retry_angle_step: std::f32::consts::PI / 8.0,
            initial_speed: 0.03..0.13,
            seed_speed: 0.01,
            rotation_speed: 0.001..0.006,
            flash_frames: 30,
            root_size: 5.0,
        }
    }
}

impl SimConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every tunable for a usable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("boundary", self.boundary),
            ("depth_ratio", self.depth_ratio),
            ("connection_radius", self.connection_radius),
            ("min_velocity", self.min_velocity),
            ("damping", self.damping),
            ("restitution_boost", self.restitution_boost),
            ("spawn_offset_factor", self.spawn_offset_factor),
            ("seed_speed", self.seed_speed),
            ("root_size", self.root_size),
        ];
        for (field, value) in positive {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
            if value <= 0.0 {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !self.max_velocity.is_finite() {
            return Err(ConfigError::NotFinite {
                field: "max_velocity",
                value: self.max_velocity,
            });
        }
        if self.min_velocity >= self.max_velocity {
            return Err(ConfigError::VelocityBounds {
                min: self.min_velocity,
                max: self.max_velocity,
            });
        }
        if self.shrink_factor.is_nan() || self.shrink_factor <= 0.0 || self.shrink_factor >= 1.0 {
            return Err(ConfigError::ShrinkFactor(self.shrink_factor));
        }
        if self.spawn_count.is_empty() || *self.spawn_count.start() == 0 {
            return Err(ConfigError::EmptyRange {
                field: "spawn_count",
            });
        }
        if *self.spawn_count.end() > MAX_SPAWN_COUNT {
            return Err(ConfigError::SpawnCountTooLarge {
                max: *self.spawn_count.end(),
                limit: MAX_SPAWN_COUNT,
            });
        }
        if self.initial_speed.is_empty() {
            return Err(ConfigError::EmptyRange {
                field: "initial_speed",
            });
        }
        if self.rotation_speed.is_empty() || self.rotation_speed.start <= 0.0 {
            return Err(ConfigError::EmptyRange {
                field: "rotation_speed",
            });
        }
        if self.max_spawn_attempts == 0 {
            return Err(ConfigError::NoSpawnAttempts);
        }
        let bounds = self.bounds();
        if !bounds.fits(self.root_size) {
            return Err(ConfigError::RootTooLarge {
                size: self.root_size,
                max: bounds.max_cube_size(),
            });
        }
        Ok(())
    }

    /// The containment volume described by `boundary` and `depth_ratio`.
    pub fn bounds(&self) -> cubefield_common::Bounds {
        cubefield_common::Bounds::slab(self.boundary, self.depth_ratio)
    }
}
