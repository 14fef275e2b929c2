use std::collections::{HashMap, HashSet};
use std::fmt;

use glam::Vec3;
use labyrinth::{BotState, PickupState, PlayerState, WorldSnapshot};

use super::Pose;
use crate::render::{PickupMarker, SceneSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Bot,
}

/// Stable identity of a displayed entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityKey {
    pub fn player(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Player,
            id: id.into(),
        }
    }

    pub fn bot(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Bot,
            id: id.into(),
        }
    }

    fn of_bot(index: usize, bot: &BotState) -> Self {
        match &bot.id {
            Some(id) => Self::bot(id.as_str()),
            None => Self::bot(format!("#{index}")),
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntityKind::Player => write!(f, "player {}", self.id),
            EntityKind::Bot => write!(f, "bot {}", self.id),
        }
    }
}

fn player_pose(player: &PlayerState) -> Pose {
    Pose::new(Vec3::new(player.x, player.y, player.z), player.yaw)
}

fn bot_pose(bot: &BotState, ground_height: f32) -> Pose {
    Pose::new(Vec3::new(bot.x, ground_height, bot.z), bot.yaw)
}

fn pickup_key(index: usize, pickup: &PickupState) -> String {
    match &pickup.id {
        Some(id) => id.clone(),
        None => format!("#{index}"),
    }
}

/// Mirrors the server's entity set onto the scene.
#[derive(Debug, Default)]
pub struct EntitySynchronizer {
    local_id: Option<String>,
    displayed: HashMap<EntityKey, Pose>,
    pickups: Vec<PickupState>,
    ground_height: f32,
}

impl EntitySynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity whose pose drives reconciliation instead of a displayed
    /// entity. A displayed entity with this identity goes away on the next
    /// snapshot.
    pub fn set_local_id(&mut self, id: impl Into<String>) {
        self.local_id = Some(id.into());
    }

    pub fn local_id(&self) -> Option<&str> {
        self.local_id.as_deref()
    }

    pub fn set_ground_height(&mut self, ground_height: f32) {
        self.ground_height = ground_height;
    }

    /// Diffs `snapshot` against what is displayed and issues spawn, move
    /// and despawn calls. Returns the local actor's authoritative pose when
    /// the snapshot carries it.
    pub fn apply_snapshot<S: SceneSink>(
        &mut self,
        snapshot: &WorldSnapshot,
        sink: &mut S,
    ) -> Option<Pose> {
        let mut seen = HashSet::with_capacity(snapshot.players.len() + snapshot.bots.len());
        let mut local = None;

        for player in &snapshot.players {
            if self.local_id.as_deref() == Some(player.id.as_str()) {
                local = Some(player_pose(player));
                continue;
            }
            let key = EntityKey::player(player.id.as_str());
            self.show(&key, player_pose(player), sink);
            seen.insert(key);
        }

        for (index, bot) in snapshot.bots.iter().enumerate() {
            let key = EntityKey::of_bot(index, bot);
            self.show(&key, bot_pose(bot, self.ground_height), sink);
            seen.insert(key);
        }

        self.displayed.retain(|key, _| {
            let keep = seen.contains(key);
            if !keep {
                sink.despawn_entity(key);
            }
            keep
        });

        if let Some(pickups) = &snapshot.pickups {
            self.replace_pickups(pickups.clone(), sink);
        }

        local
    }

    fn show<S: SceneSink>(&mut self, key: &EntityKey, pose: Pose, sink: &mut S) {
        match self.displayed.get_mut(key) {
            Some(current) => {
                *current = pose;
                sink.move_entity(key, pose);
            }
            None => {
                self.displayed.insert(key.clone(), pose);
                sink.spawn_entity(key, pose);
            }
        }
    }

    /// Replaces the last-known pickup list and redraws the unclaimed ones.
    pub fn replace_pickups<S: SceneSink>(&mut self, pickups: Vec<PickupState>, sink: &mut S) {
        self.pickups = pickups;
        self.redraw_pickups(sink);
    }

    /// Marks a pickup as taken in the last-known list and redraws. Unknown
    /// identities are ignored.
    pub fn claim_pickup<S: SceneSink>(&mut self, pickup_id: &str, sink: &mut S) -> bool {
        let found = self
            .pickups
            .iter_mut()
            .enumerate()
            .find(|(index, pickup)| pickup_key(*index, pickup) == pickup_id);

        match found {
            Some((_, pickup)) => {
                pickup.taken_by.get_or_insert_with(String::new);
                self.redraw_pickups(sink);
                true
            }
            None => {
                log::debug!("Claim for unknown pickup {}", pickup_id);
                false
            }
        }
    }

    fn redraw_pickups<S: SceneSink>(&self, sink: &mut S) {
        let markers: Vec<PickupMarker> = self
            .pickups
            .iter()
            .enumerate()
            .filter(|(_, pickup)| !pickup.is_claimed())
            .map(|(index, pickup)| PickupMarker {
                key: pickup_key(index, pickup),
                position: Vec3::new(pickup.x, self.ground_height, pickup.z),
            })
            .collect();
        sink.replace_pickups(&markers);
    }

    pub fn displayed(&self) -> impl Iterator<Item = (&EntityKey, &Pose)> {
        self.displayed.iter()
    }

    pub fn displayed_count(&self) -> usize {
        self.displayed.len()
    }

    pub fn pose_of(&self, key: &EntityKey) -> Option<Pose> {
        self.displayed.get(key).copied()
    }

    pub fn pickups(&self) -> &[PickupState] {
        &self.pickups
    }
}
