use labyrinth::GeometryConfig;
use serde::{Deserialize, Serialize};

use crate::game::{PredictorConfig, ReconcileConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub frame_rate: u32,
    /// Silence from the server, in seconds, before the session counts as lost.
    pub connection_timeout_secs: u64,
    /// Seconds between pings while connected.
    pub ping_interval_secs: f32,
    pub geometry: GeometryConfig,
    pub predictor: PredictorConfig,
    pub reconcile: ReconcileConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            connection_timeout_secs: 10,
            ping_interval_secs: 1.0,
            geometry: GeometryConfig::default(),
            predictor: PredictorConfig::default(),
            reconcile: ReconcileConfig::default(),
        }
    }
}
