use serde::{Deserialize, Serialize};

/// Geometry tuning. All distances are in world units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Distance under which two coordinates are treated as the same point.
    /// Merge and junction detection are both sensitive to this value.
    pub tolerance: f32,
    pub wall_height: f32,
    pub wall_thickness: f32,
    /// Extra shortening applied at interior junctions on top of half the
    /// wall thickness.
    pub junction_clearance: f32,
    /// Floor for a trimmed wall length.
    pub min_wall_length: f32,
    /// Added on every side of the wall extents to form the walkable bounds.
    pub bounds_margin: f32,
    pub ground_height: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-3,
            wall_height: 3.0,
            wall_thickness: 0.2,
            junction_clearance: 0.01,
            min_wall_length: 0.05,
            bounds_margin: 0.5,
            ground_height: 0.0,
        }
    }
}

impl GeometryConfig {
    /// Amount removed from a wall end that meets an interior junction.
    pub fn junction_trim(&self) -> f32 {
        self.wall_thickness * 0.5 + self.junction_clearance
    }
}
