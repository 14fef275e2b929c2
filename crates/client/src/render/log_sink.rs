use labyrinth::{WallPrimitive, WorldBounds};

use super::{PickupMarker, SceneSink};
use crate::game::{EntityKey, Pose};

/// Headless sink: keeps counts of what is on screen and logs changes.
#[derive(Debug, Default)]
pub struct LoggingSink {
    walls: usize,
    entities: usize,
    pickups: usize,
    camera: Option<Pose>,
}

impl LoggingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wall_count(&self) -> usize {
        self.walls
    }

    pub fn entity_count(&self) -> usize {
        self.entities
    }

    pub fn pickup_count(&self) -> usize {
        self.pickups
    }

    pub fn camera(&self) -> Option<Pose> {
        self.camera
    }
}

impl SceneSink for LoggingSink {
    fn rebuild_walls(&mut self, walls: &[WallPrimitive], bounds: &WorldBounds) {
        self.walls = walls.len();
        log::info!(
            "Placed {} walls, walkable area {:.1} x {:.1}",
            walls.len(),
            bounds.max_x - bounds.min_x,
            bounds.max_z - bounds.min_z
        );
    }

    fn spawn_entity(&mut self, key: &EntityKey, pose: Pose) {
        self.entities += 1;
        log::debug!(
            "Spawned {} at ({:.2}, {:.2})",
            key,
            pose.position.x,
            pose.position.z
        );
    }

    fn move_entity(&mut self, key: &EntityKey, pose: Pose) {
        log::trace!(
            "Moved {} to ({:.2}, {:.2})",
            key,
            pose.position.x,
            pose.position.z
        );
    }

    fn despawn_entity(&mut self, key: &EntityKey) {
        self.entities = self.entities.saturating_sub(1);
        log::debug!("Despawned {}", key);
    }

    fn replace_pickups(&mut self, pickups: &[PickupMarker]) {
        if pickups.len() != self.pickups {
            log::debug!("Pickups on screen: {}", pickups.len());
        }
        self.pickups = pickups.len();
    }

    fn place_ghost(&mut self, _pose: Option<Pose>) {}

    fn place_camera(&mut self, pose: Pose, _pitch: f32) {
        self.camera = Some(pose);
    }
}
