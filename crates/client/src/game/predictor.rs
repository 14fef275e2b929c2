use glam::{Quat, Vec3};
use labyrinth::{InputButtons, InputCommand, WorldBounds};
use serde::{Deserialize, Serialize};

use super::Pose;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// World units per second.
    pub move_speed: f32,
    /// Fixed height of the local actor's eye above the ground.
    pub eye_height: f32,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            eye_height: 1.6,
        }
    }
}

/// Forward basis on the ground plane for a facing.
///
/// The server rebuilds the same basis from the reported yaw, so this must
/// not drift from `right_xz`'s definition.
pub fn forward_xz(yaw: f32, pitch: f32) -> Vec3 {
    let facing = Vec3::new(yaw.sin() * pitch.cos(), pitch.sin(), yaw.cos() * pitch.cos());
    let flat = Vec3::new(facing.x, 0.0, facing.z).normalize_or_zero();
    if flat == Vec3::ZERO {
        let (sin, cos) = yaw.sin_cos();
        Vec3::new(sin, 0.0, cos)
    } else {
        flat
    }
}

/// `forward` rotated a quarter turn about +Y.
pub fn right_xz(forward: Vec3) -> Vec3 {
    Quat::from_rotation_y(std::f32::consts::FRAC_PI_2) * forward
}

/// Unit movement direction for the held buttons, zero when nothing (or only
/// opposing buttons) are held.
pub fn movement_direction(buttons: InputButtons, yaw: f32, pitch: f32) -> Vec3 {
    let forward = forward_xz(yaw, pitch);
    let right = right_xz(forward);
    let mut movement = Vec3::ZERO;

    if buttons.contains(InputButtons::FORWARD) {
        movement += forward;
    }
    if buttons.contains(InputButtons::BACK) {
        movement -= forward;
    }
    if buttons.contains(InputButtons::LEFT) {
        movement -= right;
    }
    if buttons.contains(InputButtons::RIGHT) {
        movement += right;
    }

    movement.normalize_or_zero()
}

/// Moves the local actor every frame from held input, independent of
/// snapshot arrival.
#[derive(Debug)]
pub struct LocalPredictor {
    config: PredictorConfig,
    position: Vec3,
    yaw: f32,
    pitch: f32,
}

impl LocalPredictor {
    const PITCH_LIMIT: f32 = 89.0_f32.to_radians();

    pub fn new(config: PredictorConfig) -> Self {
        let position = Vec3::new(0.0, config.eye_height, 0.0);
        Self {
            config,
            position,
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn look(&mut self, delta_yaw: f32, delta_pitch: f32) {
        self.yaw = labyrinth::math::wrap_angle(self.yaw + delta_yaw);
        self.pitch = (self.pitch + delta_pitch).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
    }

    /// Advances one frame and returns the input message for it.
    pub fn step(&mut self, buttons: InputButtons, dt: f32, bounds: &WorldBounds) -> InputCommand {
        let direction = movement_direction(buttons, self.yaw, self.pitch);
        let moved = self.position + direction * self.config.move_speed * dt.max(0.0);

        self.position = bounds.clamp(moved);
        self.position.y = bounds.ground_height + self.config.eye_height;

        InputCommand::new(buttons, self.yaw)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.yaw)
    }

    /// Overwrites position and yaw. Height stays pinned to the eye.
    pub fn set_pose(&mut self, pose: Pose, ground_height: f32) {
        self.position = Vec3::new(
            pose.position.x,
            ground_height + self.config.eye_height,
            pose.position.z,
        );
        self.yaw = labyrinth::math::wrap_angle(pose.yaw);
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }
}
