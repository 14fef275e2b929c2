mod builder;
mod config;
mod merge;
mod segment;
mod trim;

pub use builder::{WorldBounds, WorldGeometry, build};
pub use config::GeometryConfig;
pub use merge::merge;
pub use segment::{Orientation, RawSegment, Segment};
pub use trim::{Extents, JunctionKey, JunctionMap, JunctionTrimmer, WallPrimitive, trim};
