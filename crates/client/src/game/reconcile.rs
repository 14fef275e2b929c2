use glam::Vec2;
use labyrinth::math::lerp_angle;
use serde::{Deserialize, Serialize};

use super::Pose;
use super::predictor::LocalPredictor;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Ground-plane error, in world units, below which no correction runs.
    pub error_threshold: f32,
    /// Share of the remaining error removed per correction, in (0, 1].
    pub blend_fraction: f32,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            error_threshold: 0.05,
            blend_fraction: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    /// No authoritative pose seen since start or the last respawn.
    Uninitialized,
    Tracking,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correction {
    /// First pose after (re)initialization, applied as-is.
    Snapped,
    /// Error was above threshold; prediction moved toward authority.
    Blended { error: f32 },
    /// Error was within threshold; nothing changed.
    Settled { error: f32 },
}

/// Pulls the predicted pose toward the server's view of the local actor.
#[derive(Debug)]
pub struct Reconciler {
    config: ReconcileConfig,
    state: TrackingState,
    ghost: Option<Pose>,
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self {
            config,
            state: TrackingState::Uninitialized,
            ghost: None,
        }
    }

    /// Feeds a fresh authoritative pose. The first pose after a reset is
    /// applied directly; later ones blend by `blend_fraction` when the
    /// ground-plane error exceeds `error_threshold`.
    pub fn observe(
        &mut self,
        authority: Pose,
        predictor: &mut LocalPredictor,
        ground_height: f32,
    ) -> Correction {
        self.ghost = Some(authority);

        if self.state == TrackingState::Uninitialized {
            predictor.set_pose(authority, ground_height);
            self.state = TrackingState::Tracking;
            log::debug!(
                "Local actor initialized at ({:.2}, {:.2})",
                authority.position.x,
                authority.position.z
            );
            return Correction::Snapped;
        }

        let predicted = predictor.pose();
        let error = ground_distance(predicted, authority);
        if error <= self.config.error_threshold {
            return Correction::Settled { error };
        }

        let fraction = self.config.blend_fraction.clamp(0.0, 1.0);
        let position = predicted.position.lerp(authority.position, fraction);
        let yaw = lerp_angle(predicted.yaw, authority.yaw, fraction);
        predictor.set_pose(Pose::new(position, yaw), ground_height);

        Correction::Blended { error }
    }

    /// Forces the next authoritative pose to snap instead of blend.
    pub fn reset(&mut self) {
        self.state = TrackingState::Uninitialized;
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    /// Last authoritative pose of the local actor.
    pub fn ghost(&self) -> Option<Pose> {
        self.ghost
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }
}

fn ground_distance(a: Pose, b: Pose) -> f32 {
    Vec2::new(a.position.x, a.position.z).distance(Vec2::new(b.position.x, b.position.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::predictor::PredictorConfig;
    use glam::Vec3;

    fn setup() -> (Reconciler, LocalPredictor) {
        (
            Reconciler::new(ReconcileConfig::default()),
            LocalPredictor::new(PredictorConfig::default()),
        )
    }

    #[test]
    fn first_pose_snaps() {
        let (mut reconciler, mut predictor) = setup();
        let authority = Pose::new(Vec3::new(4.0, 0.0, -2.0), 1.0);

        assert_eq!(
            reconciler.observe(authority, &mut predictor, 0.0),
            Correction::Snapped
        );
        assert_eq!(reconciler.state(), TrackingState::Tracking);
        assert_eq!(predictor.position().x, 4.0);
        assert_eq!(predictor.position().z, -2.0);
        assert_eq!(predictor.yaw(), 1.0);
        assert_eq!(reconciler.ghost(), Some(authority));
    }

    #[test]
    fn error_shrinks_until_settled() {
        let (mut reconciler, mut predictor) = setup();
        reconciler.observe(Pose::new(Vec3::ZERO, 0.0), &mut predictor, 0.0);

        let authority = Pose::new(Vec3::new(3.0, 0.0, 4.0), 0.0);
        let mut last_error = f32::MAX;
        let mut frames = 0;

        loop {
            match reconciler.observe(authority, &mut predictor, 0.0) {
                Correction::Blended { error } => {
                    assert!(error < last_error);
                    last_error = error;
                }
                Correction::Settled { error } => {
                    assert!(error <= reconciler.config().error_threshold);
                    break;
                }
                Correction::Snapped => panic!("unexpected snap while tracking"),
            }
            frames += 1;
            assert!(frames < 200, "did not converge");
        }

        // 5.0 * 0.9^n <= 0.05 needs n = 44.
        assert_eq!(frames, 44);
    }

    #[test]
    fn small_error_is_ignored() {
        let (mut reconciler, mut predictor) = setup();
        reconciler.observe(Pose::new(Vec3::ZERO, 0.0), &mut predictor, 0.0);

        let authority = Pose::new(Vec3::new(0.03, 0.0, 0.0), 0.5);
        assert!(matches!(
            reconciler.observe(authority, &mut predictor, 0.0),
            Correction::Settled { .. }
        ));
        assert_eq!(predictor.position().x, 0.0);
        assert_eq!(predictor.yaw(), 0.0);
    }

    #[test]
    fn yaw_blends_across_the_seam() {
        let (mut reconciler, mut predictor) = setup();
        reconciler.observe(Pose::new(Vec3::ZERO, 3.1), &mut predictor, 0.0);

        let before = predictor.yaw();
        reconciler.observe(Pose::new(Vec3::new(1.0, 0.0, 0.0), -3.1), &mut predictor, 0.0);
        let step = labyrinth::math::angle_delta(before, predictor.yaw());

        assert!(step.abs() < std::f32::consts::PI);
        assert!(step > 0.0);
        assert!(step < 0.01);
    }

    #[test]
    fn reset_snaps_again() {
        let (mut reconciler, mut predictor) = setup();
        reconciler.observe(Pose::new(Vec3::ZERO, 0.0), &mut predictor, 0.0);
        reconciler.reset();
        assert_eq!(reconciler.state(), TrackingState::Uninitialized);

        let respawned = Pose::new(Vec3::new(20.0, 0.0, 20.0), 0.0);
        assert_eq!(
            reconciler.observe(respawned, &mut predictor, 0.0),
            Correction::Snapped
        );
        assert_eq!(predictor.position().x, 20.0);
    }
}
