use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::net::WorldDescription;

use super::config::GeometryConfig;
use super::merge::merge;
use super::trim::{Extents, WallPrimitive, trim};

/// Walkable rectangle on the ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
    pub ground_height: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        Self::from_extents(
            Extents {
                min: Vec2::splat(-Self::DEFAULT_HALF_SIZE),
                max: Vec2::splat(Self::DEFAULT_HALF_SIZE),
            },
            0.0,
            0.0,
        )
    }
}

impl WorldBounds {
    const DEFAULT_HALF_SIZE: f32 = 50.0;

    pub fn from_extents(extents: Extents, margin: f32, ground_height: f32) -> Self {
        Self {
            min_x: extents.min.x - margin,
            max_x: extents.max.x + margin,
            min_z: extents.min.y - margin,
            max_z: extents.max.y + margin,
            ground_height,
        }
    }

    /// Clamps X and Z into the rectangle, leaving Y untouched.
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        Vec3::new(
            position.x.clamp(self.min_x, self.max_x),
            position.y,
            position.z.clamp(self.min_z, self.max_z),
        )
    }

    pub fn contains(&self, position: Vec3) -> bool {
        (self.min_x..=self.max_x).contains(&position.x)
            && (self.min_z..=self.max_z).contains(&position.z)
    }

    pub fn center(&self) -> Vec3 {
        Vec3::new(
            (self.min_x + self.max_x) * 0.5,
            self.ground_height,
            (self.min_z + self.max_z) * 0.5,
        )
    }
}

/// Builds wall primitives and bounds from a world description.
///
/// Returns `None` when the description carries no usable walls, so the
/// caller keeps whatever it had.
pub fn build(
    description: &WorldDescription,
    config: &GeometryConfig,
) -> Option<(Vec<WallPrimitive>, WorldBounds)> {
    let raw = description.walls.as_deref().unwrap_or_default();
    let runs = merge(raw, config.tolerance);
    let walls = trim(&runs, config);

    let extents = Extents::from_points(walls.iter().flat_map(|w| {
        let (a, b) = w.endpoints();
        [a, b]
    }))?;

    log::debug!("Merged {} raw segments into {} runs", raw.len(), runs.len());

    let bounds = WorldBounds::from_extents(extents, config.bounds_margin, config.ground_height);
    Some((walls, bounds))
}

/// Current world geometry, replaced wholesale on every new description.
#[derive(Debug)]
pub struct WorldGeometry {
    config: GeometryConfig,
    walls: Vec<WallPrimitive>,
    bounds: WorldBounds,
    revision: u32,
}

impl Default for WorldGeometry {
    fn default() -> Self {
        Self::new(GeometryConfig::default())
    }
}

impl WorldGeometry {
    pub fn new(config: GeometryConfig) -> Self {
        Self {
            config,
            walls: Vec::new(),
            bounds: WorldBounds::default(),
            revision: 0,
        }
    }

    /// Rebuilds from `description`. Returns false and keeps the previous
    /// walls and bounds when the description has no usable walls.
    pub fn rebuild(&mut self, description: &WorldDescription) -> bool {
        match build(description, &self.config) {
            Some((walls, bounds)) => {
                log::info!(
                    "World rebuilt: {} walls, bounds x [{:.2}, {:.2}] z [{:.2}, {:.2}]",
                    walls.len(),
                    bounds.min_x,
                    bounds.max_x,
                    bounds.min_z,
                    bounds.max_z
                );
                self.walls = walls;
                self.bounds = bounds;
                self.revision = self.revision.wrapping_add(1);
                true
            }
            None => {
                log::debug!("World description has no usable walls, keeping previous geometry");
                false
            }
        }
    }

    pub fn walls(&self) -> &[WallPrimitive] {
        &self.walls
    }

    pub fn bounds(&self) -> &WorldBounds {
        &self.bounds
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    /// Incremented on every successful rebuild.
    pub fn revision(&self) -> u32 {
        self.revision
    }
}
