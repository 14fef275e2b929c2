use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use labyrinth::{ConnectionState, NetworkEndpoint, NetworkStats, PacketType};

use super::config::ClientConfig;
use crate::game::{FrameInput, GameState};
use crate::render::SceneSink;

/// Pumps the UDP endpoint into the frame loop and sends one input per frame.
pub struct NetworkClient {
    endpoint: NetworkEndpoint,
    config: ClientConfig,
    state: ConnectionState,
    game: GameState,
    last_ping_time: Instant,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

impl NetworkClient {
    pub fn new(config: ClientConfig) -> io::Result<Self> {
        let mut endpoint = NetworkEndpoint::bind("0.0.0.0:0")?;
        endpoint.set_timeout(Duration::from_secs(config.connection_timeout_secs));

        Ok(Self {
            endpoint,
            game: GameState::new(&config),
            state: ConnectionState::Disconnected,
            config,
            last_ping_time: Instant::now(),
        })
    }

    pub fn connect(&mut self, server_addr: SocketAddr) -> io::Result<()> {
        log::info!("Connecting to {}", server_addr);

        self.endpoint.set_remote(server_addr);
        self.state = ConnectionState::Connecting;

        let packet = self.endpoint.create_packet(PacketType::Hello);
        self.endpoint.send(&packet)?;

        Ok(())
    }

    /// Tells the server we are leaving. Geometry and entities stay as they
    /// were so the host can keep showing the last view.
    pub fn disconnect(&mut self) -> io::Result<()> {
        if self.state != ConnectionState::Disconnected {
            let packet = self.endpoint.create_packet(PacketType::Disconnect);
            let _ = self.endpoint.send(&packet);
        }

        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.state = ConnectionState::Disconnected;
        self.endpoint.reset();
    }

    /// One frame: receive, predict, send input, render, drain.
    pub fn update<S: SceneSink>(
        &mut self,
        input: &FrameInput,
        delta_time: f32,
        sink: &mut S,
    ) -> io::Result<()> {
        self.process_network()?;

        if self.state != ConnectionState::Disconnected && self.endpoint.is_timed_out() {
            log::warn!("Server connection lost");
            self.reset();
        }

        if self.state == ConnectionState::Connected
            && self.last_ping_time.elapsed().as_secs_f32() >= self.config.ping_interval_secs
        {
            self.send_payload(PacketType::Ping {
                timestamp: now_millis(),
            });
            self.last_ping_time = Instant::now();
        }

        let command = self.game.predict(input, delta_time);
        if self.state == ConnectionState::Connected {
            self.send_payload(PacketType::Input(command));
        }

        self.game.present(sink);

        Ok(())
    }

    fn process_network(&mut self) -> io::Result<()> {
        let packets = self.endpoint.receive()?;

        for (packet, addr) in packets {
            if self.endpoint.remote_addr() != Some(addr) {
                log::debug!("Ignoring packet from unknown peer {}", addr);
                continue;
            }
            self.handle_payload(packet.payload);
        }

        Ok(())
    }

    fn send_payload(&mut self, payload: PacketType) {
        let packet = self.endpoint.create_packet(payload);
        if let Err(e) = self.endpoint.send(&packet) {
            log::debug!("Send failed: {}", e);
        }
    }

    fn handle_payload(&mut self, payload: PacketType) {
        match payload {
            PacketType::Ping { timestamp } => self.send_payload(PacketType::Pong { timestamp }),
            PacketType::Pong { timestamp } => {
                let rtt = now_millis().saturating_sub(timestamp);
                self.endpoint.record_rtt(rtt as f32);
            }
            PacketType::Welcome { .. } => {
                if self.state != ConnectionState::Connected {
                    log::info!("Connected to server");
                    self.last_ping_time = Instant::now();
                }
                self.state = ConnectionState::Connected;
                self.game.handle_message(payload);
            }
            PacketType::Disconnect => {
                log::info!("Disconnected by server");
                self.reset();
            }
            _ => self.game.handle_message(payload),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn stats(&self) -> &NetworkStats {
        self.endpoint.stats()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.endpoint.local_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = ClientConfig::default();
        let client = NetworkClient::new(config);
        assert!(client.is_ok());

        let client = client.unwrap();
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(client.game().local_id().is_none());
    }
}
