mod endpoint;
mod protocol;
mod stats;

pub use endpoint::{ConnectionState, NetworkEndpoint};
pub use protocol::{
    BotState, DEFAULT_PORT, InputButtons, InputCommand, MAX_PACKET_SIZE, PROTOCOL_MAGIC,
    PROTOCOL_VERSION, Packet, PacketError, PacketHeader, PacketType, PickupState, PlayerState,
    WorldDescription, WorldSnapshot, sequence_greater_than,
};
pub use stats::NetworkStats;
