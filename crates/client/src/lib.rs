pub mod debug;
pub mod game;
pub mod net;
pub mod render;

pub use game::{FrameInput, GameState, Input, Pose};
pub use net::{ClientConfig, NetworkClient};
pub use render::{LoggingSink, SceneSink};
