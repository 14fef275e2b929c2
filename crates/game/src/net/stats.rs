#[derive(Debug, Clone, Default)]
pub struct NetworkStats {
    pub packets_sent: u64,
    pub packets_received: u64,
    pub packets_rejected: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    /// Smoothed round-trip time in milliseconds, zero until the first pong.
    pub rtt_ms: f32,
    pub rtt_variance: f32,
    pub rtt_samples: u64,
}

impl NetworkStats {
    /// Share of received datagrams that failed validation, in percent.
    pub fn rejected_percent(&self) -> f32 {
        let total = self.packets_received + self.packets_rejected;
        if total == 0 {
            return 0.0;
        }
        self.packets_rejected as f32 * 100.0 / total as f32
    }

    /// Folds one round-trip sample into the smoothed estimate. The first
    /// sample seeds it directly.
    pub fn record_rtt(&mut self, rtt: f32) {
        const ALPHA: f32 = 0.125;
        const BETA: f32 = 0.25;

        if self.rtt_samples == 0 {
            self.rtt_ms = rtt;
            self.rtt_variance = rtt * 0.5;
        } else {
            let diff = (rtt - self.rtt_ms).abs();
            self.rtt_variance = (1.0 - BETA) * self.rtt_variance + BETA * diff;
            self.rtt_ms = (1.0 - ALPHA) * self.rtt_ms + ALPHA * rtt;
        }
        self.rtt_samples += 1;
    }
}
