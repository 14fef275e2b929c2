mod log_sink;
mod recording;

use glam::Vec3;
use labyrinth::{WallPrimitive, WorldBounds};

pub use log_sink::LoggingSink;
pub use recording::{RecordingSink, SceneEvent};

use crate::game::{EntityKey, Pose};

/// A pickup that should currently be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct PickupMarker {
    pub key: String,
    pub position: Vec3,
}

/// Whatever draws the scene. The frame driver issues these calls; it never
/// reads anything back.
pub trait SceneSink {
    /// Drops every previously placed wall and places `walls` instead.
    fn rebuild_walls(&mut self, walls: &[WallPrimitive], bounds: &WorldBounds);

    fn spawn_entity(&mut self, key: &EntityKey, pose: Pose);

    fn move_entity(&mut self, key: &EntityKey, pose: Pose);

    fn despawn_entity(&mut self, key: &EntityKey);

    /// Replaces the whole pickup set.
    fn replace_pickups(&mut self, pickups: &[PickupMarker]);

    /// Low-opacity marker at the server's view of the local actor.
    fn place_ghost(&mut self, pose: Option<Pose>);

    fn place_camera(&mut self, pose: Pose, pitch: f32);
}
