use bitflags::bitflags;
use rkyv::{Archive, Deserialize, Serialize, rancor};

use crate::geometry::RawSegment;

/// Largest datagram the endpoint will send or accept. World descriptions
/// for big mazes don't fit a typical MTU, so this is the UDP payload limit.
pub const MAX_PACKET_SIZE: usize = 65_507;
pub const PROTOCOL_VERSION: u32 = 1;
pub const PROTOCOL_MAGIC: u32 = 0x4C41_4259;
pub const DEFAULT_PORT: u16 = 27016;

const SEQUENCE_WRAP_THRESHOLD: u32 = u32::MAX / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Archive, Serialize, Deserialize)]
#[rkyv(compare(PartialEq), derive(Debug))]
pub struct PacketHeader {
    pub magic: u32,
    pub version: u32,
    pub sequence: u32,
}

impl PacketHeader {
    pub fn new(sequence: u32) -> Self {
        Self {
            magic: PROTOCOL_MAGIC,
            version: PROTOCOL_VERSION,
            sequence,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == PROTOCOL_MAGIC && self.version == PROTOCOL_VERSION
    }
}

#[inline]
pub fn sequence_greater_than(s1: u32, s2: u32) -> bool {
    ((s1 > s2) && (s1 - s2 <= SEQUENCE_WRAP_THRESHOLD))
        || ((s1 < s2) && (s2 - s1 > SEQUENCE_WRAP_THRESHOLD))
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub enum PacketType {
    /// Client → server, opens the session.
    Hello,
    /// Server → client, assigns the local player's identity.
    Welcome { player_id: String },
    WorldDescription(WorldDescription),
    Snapshot(WorldSnapshot),
    PickupClaimed { pickup_id: String },
    Respawn { player_id: String },
    /// Client → server, sent once per rendered frame.
    Input(InputCommand),
    /// Either direction; the peer answers with a `Pong` carrying the same
    /// timestamp.
    Ping { timestamp: u64 },
    Pong { timestamp: u64 },
    Disconnect,
}

/// Static world layout. Either list may be missing; a missing list is
/// treated as empty by consumers.
#[derive(Debug, Clone, Default, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct WorldDescription {
    pub walls: Option<Vec<RawSegment>>,
    pub pickups: Option<Vec<PickupState>>,
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct PickupState {
    pub id: Option<String>,
    pub x: f32,
    pub z: f32,
    pub taken_by: Option<String>,
}

impl PickupState {
    pub fn new(id: impl Into<String>, x: f32, z: f32) -> Self {
        Self {
            id: Some(id.into()),
            x,
            z,
            taken_by: None,
        }
    }

    pub fn is_claimed(&self) -> bool {
        self.taken_by.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct PlayerState {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub yaw: f32,
}

impl PlayerState {
    pub fn new(id: impl Into<String>, x: f32, y: f32, z: f32, yaw: f32) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            z,
            yaw,
        }
    }
}

/// Bots are usually sent without identity; consumers fall back to the
/// bot's index in the list.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct BotState {
    pub id: Option<String>,
    pub x: f32,
    pub z: f32,
    pub yaw: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct WorldSnapshot {
    pub tick: u32,
    pub players: Vec<PlayerState>,
    pub bots: Vec<BotState>,
    /// `None` when the server left pickups out of this snapshot.
    pub pickups: Option<Vec<PickupState>>,
}

impl WorldSnapshot {
    pub fn new(tick: u32) -> Self {
        Self {
            tick,
            ..Default::default()
        }
    }

    pub fn player(&self, id: &str) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id == id)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InputButtons: u8 {
        const FORWARD = 1 << 0;
        const BACK = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

/// Held movement keys and facing. Frame time is deliberately absent: the
/// server integrates on its own clock.
#[derive(Debug, Clone, Copy, PartialEq, Default, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct InputCommand {
    pub buttons: u8,
    pub yaw: f32,
}

impl InputCommand {
    pub fn new(buttons: InputButtons, yaw: f32) -> Self {
        Self {
            buttons: buttons.bits(),
            yaw,
        }
    }

    pub fn buttons(&self) -> InputButtons {
        InputButtons::from_bits_truncate(self.buttons)
    }

    pub fn forward(&self) -> bool {
        self.buttons().contains(InputButtons::FORWARD)
    }

    pub fn back(&self) -> bool {
        self.buttons().contains(InputButtons::BACK)
    }

    pub fn left(&self) -> bool {
        self.buttons().contains(InputButtons::LEFT)
    }

    pub fn right(&self) -> bool {
        self.buttons().contains(InputButtons::RIGHT)
    }
}

#[derive(Debug, Clone, Archive, Serialize, Deserialize)]
#[rkyv(derive(Debug))]
pub struct Packet {
    pub header: PacketHeader,
    pub payload: PacketType,
}

#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    #[error("serialization failed: {0}")]
    Serialize(rancor::Error),
    #[error("deserialization failed: {0}")]
    Deserialize(rancor::Error),
}

impl Packet {
    pub fn new(header: PacketHeader, payload: PacketType) -> Self {
        Self { header, payload }
    }

    pub fn serialize(&self) -> Result<Vec<u8>, PacketError> {
        rkyv::to_bytes::<rancor::Error>(self)
            .map(|aligned| aligned.into_vec())
            .map_err(PacketError::Serialize)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, PacketError> {
        rkyv::from_bytes::<Self, rancor::Error>(data).map_err(PacketError::Deserialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_comparison() {
        assert!(sequence_greater_than(2, 1));
        assert!(!sequence_greater_than(1, 2));
        assert!(sequence_greater_than(0, u32::MAX));
        assert!(!sequence_greater_than(u32::MAX, 0));
    }

    #[test]
    fn input_flags_survive_encoding() {
        let command = InputCommand::new(InputButtons::FORWARD | InputButtons::RIGHT, 1.25);
        assert!(command.forward());
        assert!(command.right());
        assert!(!command.back());
        assert!(!command.left());

        let packet = Packet::new(PacketHeader::new(7), PacketType::Input(command));
        let decoded = Packet::deserialize(&packet.serialize().unwrap()).unwrap();
        match decoded.payload {
            PacketType::Input(received) => assert_eq!(received, command),
            other => panic!("expected Input, got {other:?}"),
        }
        assert_eq!(decoded.header.sequence, 7);
    }

    #[test]
    fn world_description_keeps_missing_lists() {
        let description = WorldDescription {
            walls: Some(vec![RawSegment::new(0.0, 0.0, 4.0, 0.0)]),
            pickups: None,
        };
        let packet = Packet::new(
            PacketHeader::new(1),
            PacketType::WorldDescription(description.clone()),
        );
        let decoded = Packet::deserialize(&packet.serialize().unwrap()).unwrap();
        match decoded.payload {
            PacketType::WorldDescription(received) => assert_eq!(received, description),
            other => panic!("expected WorldDescription, got {other:?}"),
        }
    }

    #[test]
    fn ping_keeps_its_timestamp() {
        let packet = Packet::new(
            PacketHeader::new(3),
            PacketType::Ping {
                timestamp: 1_700_000_000_123,
            },
        );
        let decoded = Packet::deserialize(&packet.serialize().unwrap()).unwrap();
        match decoded.payload {
            PacketType::Ping { timestamp } => assert_eq!(timestamp, 1_700_000_000_123),
            other => panic!("expected Ping, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(Packet::deserialize(&[0xAB; 32]).is_err());
    }
}
