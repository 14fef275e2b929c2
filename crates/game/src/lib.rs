pub mod geometry;
pub mod math;
pub mod net;

pub use geometry::{
    GeometryConfig, Orientation, RawSegment, Segment, WallPrimitive, WorldBounds, WorldGeometry,
};
pub use net::{
    BotState, ConnectionState, DEFAULT_PORT, InputButtons, InputCommand, NetworkEndpoint,
    NetworkStats, Packet, PacketError, PacketHeader, PacketType, PickupState, PlayerState,
    WorldDescription, WorldSnapshot,
};
