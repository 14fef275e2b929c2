use labyrinth::{WallPrimitive, WorldBounds};

use super::{PickupMarker, SceneSink};
use crate::game::{EntityKey, Pose};

#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    Walls { count: usize, bounds: WorldBounds },
    Spawn(EntityKey, Pose),
    Move(EntityKey, Pose),
    Despawn(EntityKey),
    Pickups(Vec<PickupMarker>),
    Ghost(Option<Pose>),
    Camera(Pose),
}

/// Sink that remembers every call in order, for tests and replays.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<SceneEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn despawns(&self) -> Vec<&EntityKey> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SceneEvent::Despawn(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn spawns(&self) -> Vec<&EntityKey> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SceneEvent::Spawn(key, _) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn last_pickups(&self) -> Option<&[PickupMarker]> {
        self.events.iter().rev().find_map(|event| match event {
            SceneEvent::Pickups(pickups) => Some(pickups.as_slice()),
            _ => None,
        })
    }

    pub fn last_camera(&self) -> Option<Pose> {
        self.events.iter().rev().find_map(|event| match event {
            SceneEvent::Camera(pose) => Some(*pose),
            _ => None,
        })
    }
}

impl SceneSink for RecordingSink {
    fn rebuild_walls(&mut self, walls: &[WallPrimitive], bounds: &WorldBounds) {
        self.events.push(SceneEvent::Walls {
            count: walls.len(),
            bounds: *bounds,
        });
    }

    fn spawn_entity(&mut self, key: &EntityKey, pose: Pose) {
        self.events.push(SceneEvent::Spawn(key.clone(), pose));
    }

    fn move_entity(&mut self, key: &EntityKey, pose: Pose) {
        self.events.push(SceneEvent::Move(key.clone(), pose));
    }

    fn despawn_entity(&mut self, key: &EntityKey) {
        self.events.push(SceneEvent::Despawn(key.clone()));
    }

    fn replace_pickups(&mut self, pickups: &[PickupMarker]) {
        self.events.push(SceneEvent::Pickups(pickups.to_vec()));
    }

    fn place_ghost(&mut self, pose: Option<Pose>) {
        self.events.push(SceneEvent::Ghost(pose));
    }

    fn place_camera(&mut self, pose: Pose, _pitch: f32) {
        self.events.push(SceneEvent::Camera(pose));
    }
}
