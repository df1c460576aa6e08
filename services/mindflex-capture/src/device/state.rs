//! Per-headset state tracking

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::mindflex::PacketKind;

/// Decoding statistics for a single headset connection
#[derive(Debug, Default)]
pub struct DeviceStats {
    pub bytes_received: AtomicU64,
    pub noise_bytes: AtomicU64,
    pub frames_decoded: AtomicU64,
    pub bad_packets: AtomicU64,
    pub mode_references: AtomicU64,
    pub raw_packets: AtomicU64,
    pub computed_packets: AtomicU64,
}

impl DeviceStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_bytes(&self, n: usize) {
        self.bytes_received.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn record_noise(&self, n: usize) {
        if n > 0 {
            self.noise_bytes.fetch_add(n as u64, Ordering::Relaxed);
        }
    }

    pub fn record_frame(&self) {
        self.frames_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bad_packet(&self) {
        self.bad_packets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mode_reference(&self) {
        self.mode_references.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_packet(&self, kind: PacketKind) {
        match kind {
            PacketKind::Raw => self.raw_packets.fetch_add(1, Ordering::Relaxed),
            _ => self.computed_packets.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn get_bytes(&self) -> u64 {
        self.bytes_received.load(Ordering::Relaxed)
    }

    pub fn get_noise(&self) -> u64 {
        self.noise_bytes.load(Ordering::Relaxed)
    }

    pub fn get_frames(&self) -> u64 {
        self.frames_decoded.load(Ordering::Relaxed)
    }

    pub fn get_bad_packets(&self) -> u64 {
        self.bad_packets.load(Ordering::Relaxed)
    }

    pub fn get_mode_references(&self) -> u64 {
        self.mode_references.load(Ordering::Relaxed)
    }

    pub fn get_raw_packets(&self) -> u64 {
        self.raw_packets.load(Ordering::Relaxed)
    }

    pub fn get_computed_packets(&self) -> u64 {
        self.computed_packets.load(Ordering::Relaxed)
    }
}

impl std::fmt::Display for DeviceStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bytes: {} | Frames: {} | Raw: {} | Computed: {} | Bad: {} | Noise: {} | Mode00: {}",
            self.get_bytes(),
            self.get_frames(),
            self.get_raw_packets(),
            self.get_computed_packets(),
            self.get_bad_packets(),
            self.get_noise(),
            self.get_mode_references()
        )
    }
}

/// State for a single headset connection
#[derive(Debug)]
pub struct DeviceState {
    pub device_id: String,
    pub port: String,
    pub baud_rate: u32,
    pub connected: AtomicBool,
}

impl DeviceState {
    pub fn new(device_id: String, port: String, baud_rate: u32) -> Self {
        Self {
            device_id,
            port,
            baud_rate,
            connected: AtomicBool::new(false),
        }
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let stats = DeviceStats::new();
        stats.record_bytes(12);
        stats.record_noise(0);
        stats.record_noise(3);
        stats.record_packet(PacketKind::Raw);
        stats.record_packet(PacketKind::AllComputed);
        stats.record_packet(PacketKind::AttentionComputed);

        assert_eq!(stats.get_bytes(), 12);
        assert_eq!(stats.get_noise(), 3);
        assert_eq!(stats.get_raw_packets(), 1);
        assert_eq!(stats.get_computed_packets(), 2);
        assert!(stats.to_string().contains("Raw: 1"));
    }
}
