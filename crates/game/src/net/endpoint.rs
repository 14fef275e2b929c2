use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

use super::protocol::{MAX_PACKET_SIZE, Packet, PacketHeader, PacketType};
use super::stats::NetworkStats;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Non-blocking UDP socket speaking [`Packet`]s.
pub struct NetworkEndpoint {
    socket: UdpSocket,
    local_addr: SocketAddr,
    remote_addr: Option<SocketAddr>,
    stats: NetworkStats,
    recv_buffer: Vec<u8>,
    send_sequence: u32,
    timeout: Duration,
    last_receive_time: Instant,
}

impl NetworkEndpoint {
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;

        let local_addr = socket.local_addr()?;

        Ok(Self {
            socket,
            local_addr,
            remote_addr: None,
            stats: NetworkStats::default(),
            recv_buffer: vec![0u8; MAX_PACKET_SIZE],
            send_sequence: 0,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            last_receive_time: Instant::now(),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    pub fn set_remote(&mut self, addr: SocketAddr) {
        self.remote_addr = Some(addr);
        self.last_receive_time = Instant::now();
    }

    pub fn stats(&self) -> &NetworkStats {
        &self.stats
    }

    pub fn record_rtt(&mut self, rtt_ms: f32) {
        self.stats.record_rtt(rtt_ms);
    }

    /// Wraps `payload` with the next outgoing sequence number.
    pub fn create_packet(&mut self, payload: PacketType) -> Packet {
        let header = PacketHeader::new(self.send_sequence);
        self.send_sequence = self.send_sequence.wrapping_add(1);
        Packet::new(header, payload)
    }

    pub fn send_to(&mut self, packet: &Packet, addr: SocketAddr) -> io::Result<usize> {
        let data = packet.serialize().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Serialization error: {}", e),
            )
        })?;

        if data.len() > MAX_PACKET_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "Packet exceeds maximum datagram size",
            ));
        }

        let bytes = self.socket.send_to(&data, addr)?;

        self.stats.packets_sent += 1;
        self.stats.bytes_sent += bytes as u64;

        Ok(bytes)
    }

    pub fn send(&mut self, packet: &Packet) -> io::Result<usize> {
        let addr = self
            .remote_addr
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "No remote address set"))?;
        self.send_to(packet, addr)
    }

    /// Drains every pending datagram. Undecodable or foreign packets are
    /// counted and skipped.
    pub fn receive(&mut self) -> io::Result<Vec<(Packet, SocketAddr)>> {
        let mut packets = Vec::new();

        loop {
            match self.socket.recv_from(&mut self.recv_buffer) {
                Ok((size, addr)) => match Packet::deserialize(&self.recv_buffer[..size]) {
                    Ok(packet) if packet.header.is_valid() => {
                        self.stats.packets_received += 1;
                        self.stats.bytes_received += size as u64;

                        self.last_receive_time = Instant::now();
                        packets.push((packet, addr));
                    }
                    Ok(_) => {
                        self.stats.packets_rejected += 1;
                        log::debug!("Dropping packet with foreign header from {}", addr);
                    }
                    Err(e) => {
                        self.stats.packets_rejected += 1;
                        log::warn!("Dropping undecodable packet from {}: {}", addr, e);
                    }
                },
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(e),
            }
        }

        Ok(packets)
    }

    pub fn is_timed_out(&self) -> bool {
        self.last_receive_time.elapsed() > self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn reset(&mut self) {
        self.remote_addr = None;
        self.stats = NetworkStats::default();
        self.send_sequence = 0;
        self.last_receive_time = Instant::now();
    }
}
