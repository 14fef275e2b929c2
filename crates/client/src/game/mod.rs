mod input;
mod mailbox;
mod predictor;
mod reconcile;
mod sync;

use glam::Vec3;
use labyrinth::net::sequence_greater_than;
use labyrinth::{InputCommand, PacketType, WorldDescription, WorldGeometry, WorldSnapshot};

pub use input::{FrameInput, Input};
pub use mailbox::Mailbox;
pub use predictor::{LocalPredictor, PredictorConfig, forward_xz, movement_direction, right_xz};
pub use reconcile::{Correction, ReconcileConfig, Reconciler, TrackingState};
pub use sync::{EntityKey, EntityKind, EntitySynchronizer};

use crate::net::ClientConfig;
use crate::render::SceneSink;

/// Ground-plane position plus facing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub yaw: f32,
}

impl Pose {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }
}

/// Discrete server notifications applied during the drain phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    PickupClaimed(String),
    Respawn(String),
}

/// Everything the frame loop owns. Inbound messages only land in mailboxes;
/// all mutation from them happens in [`GameState::present`].
pub struct GameState {
    geometry: WorldGeometry,
    predictor: LocalPredictor,
    reconciler: Reconciler,
    sync: EntitySynchronizer,
    descriptions: Mailbox<WorldDescription>,
    snapshots: Mailbox<WorldSnapshot>,
    events: Vec<ServerEvent>,
    last_tick: Option<u32>,
    snapshots_applied: u64,
    snapshots_stale: u64,
}

impl GameState {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            geometry: WorldGeometry::new(config.geometry.clone()),
            predictor: LocalPredictor::new(config.predictor.clone()),
            reconciler: Reconciler::new(config.reconcile.clone()),
            sync: EntitySynchronizer::new(),
            descriptions: Mailbox::new(),
            snapshots: Mailbox::new(),
            events: Vec::new(),
            last_tick: None,
            snapshots_applied: 0,
            snapshots_stale: 0,
        }
    }

    /// Stores an inbound payload for the next drain. Payloads that carry
    /// nothing for the frame loop are ignored.
    pub fn handle_message(&mut self, payload: PacketType) {
        match payload {
            PacketType::Welcome { player_id } => {
                log::info!("Local player is {}", player_id);
                self.sync.set_local_id(player_id);
                self.reconciler.reset();
                // A new session restarts the server's tick count.
                self.last_tick = None;
                self.snapshots.take();
            }
            PacketType::WorldDescription(description) => {
                if self.descriptions.put(description) {
                    log::debug!("Replaced an unapplied world description");
                }
            }
            PacketType::Snapshot(snapshot) => self.receive_snapshot(snapshot),
            PacketType::PickupClaimed { pickup_id } => {
                self.events.push(ServerEvent::PickupClaimed(pickup_id));
            }
            PacketType::Respawn { player_id } => {
                self.events.push(ServerEvent::Respawn(player_id));
            }
            PacketType::Hello
            | PacketType::Input(_)
            | PacketType::Ping { .. }
            | PacketType::Pong { .. }
            | PacketType::Disconnect => {}
        }
    }

    fn receive_snapshot(&mut self, snapshot: WorldSnapshot) {
        let newest = self
            .snapshots
            .peek()
            .map(|pending| pending.tick)
            .or(self.last_tick);

        if let Some(newest) = newest {
            if !sequence_greater_than(snapshot.tick, newest) {
                self.snapshots_stale += 1;
                log::debug!(
                    "Dropping stale snapshot {} (have {})",
                    snapshot.tick,
                    newest
                );
                return;
            }
        }

        self.snapshots.put(snapshot);
    }

    /// Runs one whole frame and returns the input to send for it. Hosts that
    /// send between prediction and rendering call [`Self::predict`] and
    /// [`Self::present`] instead.
    pub fn frame<S: SceneSink>(&mut self, input: &FrameInput, dt: f32, sink: &mut S) -> InputCommand {
        let command = self.predict(input, dt);
        self.present(sink);
        command
    }

    /// Applies look and movement for this frame.
    pub fn predict(&mut self, input: &FrameInput, dt: f32) -> InputCommand {
        self.predictor.look(input.look.x, input.look.y);
        self.predictor.step(input.buttons, dt, self.geometry.bounds())
    }

    /// Places the camera, then drains whatever arrived since last frame.
    pub fn present<S: SceneSink>(&mut self, sink: &mut S) {
        sink.place_camera(self.predictor.pose(), self.predictor.pitch());
        self.drain(sink);
    }

    fn drain<S: SceneSink>(&mut self, sink: &mut S) {
        if let Some(description) = self.descriptions.take() {
            self.apply_description(description, sink);
        }

        for event in std::mem::take(&mut self.events) {
            self.apply_event(event, sink);
        }

        if let Some(snapshot) = self.snapshots.take() {
            self.apply_snapshot(snapshot, sink);
        }
    }

    fn apply_description<S: SceneSink>(&mut self, description: WorldDescription, sink: &mut S) {
        if self.geometry.rebuild(&description) {
            let bounds = *self.geometry.bounds();
            sink.rebuild_walls(self.geometry.walls(), &bounds);
            self.sync.set_ground_height(bounds.ground_height);
        }
        self.sync
            .replace_pickups(description.pickups.unwrap_or_default(), sink);
    }

    fn apply_event<S: SceneSink>(&mut self, event: ServerEvent, sink: &mut S) {
        match event {
            ServerEvent::PickupClaimed(pickup_id) => {
                self.sync.claim_pickup(&pickup_id, sink);
            }
            ServerEvent::Respawn(player_id) => {
                if self.sync.local_id() == Some(player_id.as_str()) {
                    log::info!("Respawned, next snapshot will snap");
                    self.reconciler.reset();
                } else {
                    log::debug!("Ignoring respawn for {}", player_id);
                }
            }
        }
    }

    fn apply_snapshot<S: SceneSink>(&mut self, snapshot: WorldSnapshot, sink: &mut S) {
        self.last_tick = Some(snapshot.tick);
        self.snapshots_applied += 1;

        let Some(authority) = self.sync.apply_snapshot(&snapshot, sink) else {
            return;
        };

        let ground_height = self.geometry.bounds().ground_height;
        let correction = self
            .reconciler
            .observe(authority, &mut self.predictor, ground_height);
        if let Correction::Blended { error } = correction {
            log::trace!("Tick {}: corrected {:.3} units", snapshot.tick, error);
        }
        sink.place_ghost(self.reconciler.ghost());
    }

    pub fn geometry(&self) -> &WorldGeometry {
        &self.geometry
    }

    pub fn predictor(&self) -> &LocalPredictor {
        &self.predictor
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn synchronizer(&self) -> &EntitySynchronizer {
        &self.sync
    }

    pub fn local_id(&self) -> Option<&str> {
        self.sync.local_id()
    }

    pub fn last_tick(&self) -> Option<u32> {
        self.last_tick
    }

    pub fn snapshots_applied(&self) -> u64 {
        self.snapshots_applied
    }

    /// Snapshots that never reached the drain: out of order, or overwritten
    /// by a newer one within the same frame.
    pub fn snapshots_dropped(&self) -> u64 {
        self.snapshots_stale + self.snapshots.overwritten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RecordingSink, SceneEvent};
    use labyrinth::{InputButtons, PickupState, PlayerState, RawSegment};

    fn square_room() -> WorldDescription {
        WorldDescription {
            walls: Some(vec![
                RawSegment::new(0.0, 0.0, 10.0, 0.0),
                RawSegment::new(10.0, 0.0, 10.0, 10.0),
                RawSegment::new(10.0, 10.0, 0.0, 10.0),
                RawSegment::new(0.0, 10.0, 0.0, 0.0),
            ]),
            pickups: Some(vec![PickupState::new("coin", 5.0, 5.0)]),
        }
    }

    fn me_at(tick: u32, x: f32, z: f32) -> WorldSnapshot {
        WorldSnapshot {
            tick,
            players: vec![PlayerState::new("me", x, 1.6, z, 0.0)],
            bots: Vec::new(),
            pickups: None,
        }
    }

    fn joined() -> GameState {
        let mut game = GameState::new(&ClientConfig::default());
        game.handle_message(PacketType::Welcome {
            player_id: "me".into(),
        });
        game
    }

    #[test]
    fn camera_is_placed_before_drain() {
        let mut game = joined();
        let mut sink = RecordingSink::new();
        game.handle_message(PacketType::WorldDescription(square_room()));

        game.frame(&FrameInput::default(), 0.016, &mut sink);

        assert!(matches!(sink.events[0], SceneEvent::Camera(_)));
        assert!(matches!(sink.events[1], SceneEvent::Walls { count: 4, .. }));
        assert!(matches!(&sink.events[2], SceneEvent::Pickups(p) if p.len() == 1));
        assert_eq!(game.geometry().bounds().max_x, 10.5);
    }

    #[test]
    fn first_snapshot_snaps_then_blends() {
        let mut game = joined();
        let mut sink = RecordingSink::new();

        game.handle_message(PacketType::Snapshot(me_at(1, 4.0, 4.0)));
        game.frame(&FrameInput::default(), 0.016, &mut sink);
        assert_eq!(game.predictor().position().x, 4.0);
        assert_eq!(game.reconciler().state(), TrackingState::Tracking);

        game.handle_message(PacketType::Snapshot(me_at(2, 5.0, 4.0)));
        game.frame(&FrameInput::default(), 0.016, &mut sink);
        let x = game.predictor().position().x;
        assert!(x > 4.0 && x < 5.0);
    }

    #[test]
    fn respawn_forces_a_snap() {
        let mut game = joined();
        let mut sink = RecordingSink::new();

        game.handle_message(PacketType::Snapshot(me_at(1, 0.0, 0.0)));
        game.frame(&FrameInput::default(), 0.016, &mut sink);

        game.handle_message(PacketType::Respawn {
            player_id: "me".into(),
        });
        game.handle_message(PacketType::Snapshot(me_at(2, 30.0, -20.0)));
        game.frame(&FrameInput::default(), 0.016, &mut sink);

        assert_eq!(game.predictor().position().x, 30.0);
        assert_eq!(game.predictor().position().z, -20.0);
    }

    #[test]
    fn burst_collapses_to_latest_snapshot() {
        let mut game = joined();
        let mut sink = RecordingSink::new();

        for tick in 1..=5 {
            game.handle_message(PacketType::Snapshot(me_at(tick, tick as f32, 0.0)));
        }
        game.frame(&FrameInput::default(), 0.016, &mut sink);

        assert_eq!(game.snapshots_applied(), 1);
        assert_eq!(game.last_tick(), Some(5));
        assert_eq!(game.snapshots_dropped(), 4);
        assert_eq!(game.predictor().position().x, 5.0);
    }

    #[test]
    fn stale_snapshot_is_ignored() {
        let mut game = joined();
        let mut sink = RecordingSink::new();

        game.handle_message(PacketType::Snapshot(me_at(10, 1.0, 1.0)));
        game.frame(&FrameInput::default(), 0.016, &mut sink);
        game.handle_message(PacketType::Snapshot(me_at(9, 8.0, 8.0)));
        game.frame(&FrameInput::default(), 0.016, &mut sink);

        assert_eq!(game.last_tick(), Some(10));
        assert_eq!(game.snapshots_applied(), 1);
    }

    #[test]
    fn welcome_restarts_tick_tracking() {
        let mut game = joined();
        let mut sink = RecordingSink::new();

        game.handle_message(PacketType::Snapshot(me_at(5000, 1.0, 1.0)));
        game.frame(&FrameInput::default(), 0.016, &mut sink);

        game.handle_message(PacketType::Welcome {
            player_id: "me".into(),
        });
        game.handle_message(PacketType::Snapshot(me_at(1, 7.0, 1.0)));
        game.frame(&FrameInput::default(), 0.016, &mut sink);

        assert_eq!(game.snapshots_applied(), 2);
        assert_eq!(game.last_tick(), Some(1));
        assert_eq!(game.predictor().position().x, 7.0);
    }

    #[test]
    fn shrunken_bounds_pull_the_actor_inside() {
        let mut game = joined();
        let mut sink = RecordingSink::new();

        game.handle_message(PacketType::WorldDescription(square_room()));
        game.handle_message(PacketType::Snapshot(me_at(1, 9.0, 9.0)));
        game.frame(&FrameInput::default(), 0.016, &mut sink);
        assert_eq!(game.predictor().position().x, 9.0);

        let small_room = WorldDescription {
            walls: Some(vec![
                RawSegment::new(0.0, 0.0, 4.0, 0.0),
                RawSegment::new(4.0, 0.0, 4.0, 4.0),
                RawSegment::new(4.0, 4.0, 0.0, 4.0),
                RawSegment::new(0.0, 4.0, 0.0, 0.0),
            ]),
            pickups: None,
        };
        game.handle_message(PacketType::WorldDescription(small_room));
        game.frame(&FrameInput::default(), 0.016, &mut sink);
        assert_eq!(game.geometry().bounds().max_x, 4.5);

        game.frame(&FrameInput::default(), 0.016, &mut sink);
        let position = game.predictor().position();
        assert_eq!(position.x, 4.5);
        assert_eq!(position.z, 4.5);
    }

    #[test]
    fn prediction_runs_without_snapshots() {
        let mut game = joined();
        let mut sink = RecordingSink::new();
        let input = FrameInput {
            buttons: InputButtons::FORWARD,
            ..Default::default()
        };

        let command = game.frame(&input, 0.2, &mut sink);

        assert!(command.forward());
        assert!((game.predictor().position().z - 1.0).abs() < 1e-5);
        assert!(sink.last_camera().is_some());
    }

    #[test]
    fn empty_description_keeps_walls_but_clears_pickups() {
        let mut game = joined();
        let mut sink = RecordingSink::new();
        game.handle_message(PacketType::WorldDescription(square_room()));
        game.frame(&FrameInput::default(), 0.016, &mut sink);
        sink.clear();

        game.handle_message(PacketType::WorldDescription(WorldDescription::default()));
        game.frame(&FrameInput::default(), 0.016, &mut sink);

        assert_eq!(game.geometry().walls().len(), 4);
        assert!(!sink.events.iter().any(|e| matches!(e, SceneEvent::Walls { .. })));
        assert_eq!(sink.last_pickups().map(<[_]>::len), Some(0));
    }
}
