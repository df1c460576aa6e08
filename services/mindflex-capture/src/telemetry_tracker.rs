//! Headset state tracking and aggregation
//!
//! Individual packets only carry part of the picture: raw packets arrive at
//! 512 Hz while attention, meditation and band powers arrive once a second.
//! The tracker keeps the latest value of every field and per-kind counts.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::mindflex::{EegSpectrum, PacketKind, TelemetryRecord};
use crate::stream::DecoderEvent;

/// Poor-signal value reported when the sensor is not touching skin
const NO_CONTACT_SIGNAL: u8 = 200;

/// Readings older than this are considered stale
const STALE_AFTER_SECS: u64 = 5;

/// Latest known value of every telemetry field
#[derive(Debug, Clone, Default)]
pub struct HeadsetReadings {
    pub signal_quality: Option<u8>,
    pub attention: Option<u8>,
    pub meditation: Option<u8>,
    pub blink_strength: Option<u8>,
    pub raw_wave_sample: Option<i16>,
    pub eeg_spectrum: Option<EegSpectrum>,
    /// Timestamp of the last record merged in
    pub updated_at: Option<DateTime<Utc>>,
}

impl HeadsetReadings {
    /// Merge fields present in `record`; absent fields keep their previous value
    fn merge(&mut self, record: &TelemetryRecord) {
        if record.signal_quality.is_some() {
            self.signal_quality = record.signal_quality;
        }
        if record.attention.is_some() {
            self.attention = record.attention;
        }
        if record.meditation.is_some() {
            self.meditation = record.meditation;
        }
        if record.blink_strength.is_some() {
            self.blink_strength = record.blink_strength;
        }
        if record.raw_wave_sample.is_some() {
            self.raw_wave_sample = record.raw_wave_sample;
        }
        if record.eeg_spectrum.is_some() {
            self.eeg_spectrum = record.eeg_spectrum;
        }
        self.updated_at = Some(record.timestamp);
    }

    /// Sensor reports skin contact
    pub fn has_contact(&self) -> bool {
        matches!(self.signal_quality, Some(q) if q < NO_CONTACT_SIGNAL)
    }
}

/// Aggregates decoder events for one headset
#[derive(Debug)]
pub struct TelemetryTracker {
    readings: HeadsetReadings,
    packets: HashMap<PacketKind, u64>,
    bad_packets: u64,
    mode_references: u64,
    last_packet: Option<Instant>,
    contact_logged: Option<bool>,
}

impl Default for TelemetryTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryTracker {
    pub fn new() -> Self {
        Self {
            readings: HeadsetReadings::default(),
            packets: HashMap::with_capacity(4),
            bad_packets: 0,
            mode_references: 0,
            last_packet: None,
            contact_logged: None,
        }
    }

    /// Update state with a decoder event
    /// Returns the merged readings when the event carried a record
    pub fn update(&mut self, event: &DecoderEvent) -> Option<&HeadsetReadings> {
        match event {
            DecoderEvent::ModeReference => {
                self.mode_references += 1;
                None
            }
            DecoderEvent::BadPacket(_) => {
                self.bad_packets += 1;
                None
            }
            _ => {
                let kind = event.kind()?;
                let record = event.record()?;
                *self.packets.entry(kind).or_insert(0) += 1;
                self.last_packet = Some(Instant::now());
                self.readings.merge(record);
                self.log_contact_change();
                Some(&self.readings)
            }
        }
    }

    pub fn readings(&self) -> &HeadsetReadings {
        &self.readings
    }

    pub fn packet_count(&self, kind: PacketKind) -> u64 {
        self.packets.get(&kind).copied().unwrap_or(0)
    }

    /// No packet within the staleness window
    pub fn is_stale(&self) -> bool {
        self.last_packet
            .map_or(true, |t| t.elapsed() > Duration::from_secs(STALE_AFTER_SECS))
    }

    fn log_contact_change(&mut self) {
        if self.readings.signal_quality.is_none() {
            return;
        }
        let contact = self.readings.has_contact();
        if self.contact_logged != Some(contact) {
            if contact {
                info!("Headset contact established");
            } else {
                info!("Headset lost skin contact");
            }
            self.contact_logged = Some(contact);
        } else {
            debug!("Signal quality {:?}", self.readings.signal_quality);
        }
    }

    /// Get summary statistics
    pub fn stats_summary(&self) -> TrackerStats {
        TrackerStats {
            raw_packets: self.packet_count(PacketKind::Raw),
            computed_packets: self.packet_count(PacketKind::AllComputed)
                + self.packet_count(PacketKind::AttentionComputed)
                + self.packet_count(PacketKind::MeditationComputed),
            bad_packets: self.bad_packets,
            mode_references: self.mode_references,
            attention: self.readings.attention,
            meditation: self.readings.meditation,
            signal_quality: self.readings.signal_quality,
            stale: self.is_stale(),
        }
    }
}

/// Tracker statistics
#[derive(Debug, Clone)]
pub struct TrackerStats {
    pub raw_packets: u64,
    pub computed_packets: u64,
    pub bad_packets: u64,
    pub mode_references: u64,
    pub attention: Option<u8>,
    pub meditation: Option<u8>,
    pub signal_quality: Option<u8>,
    pub stale: bool,
}

impl std::fmt::Display for TrackerStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |v: Option<u8>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        write!(
            f,
            "Packets: {} raw, {} computed, {} bad | attention {} meditation {} signal {}{}",
            self.raw_packets,
            self.computed_packets,
            self.bad_packets,
            show(self.attention),
            show(self.meditation),
            show(self.signal_quality),
            if self.stale { " (stale)" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn computed(attention: Option<u8>, meditation: Option<u8>, signal: Option<u8>) -> DecoderEvent {
        let mut record = TelemetryRecord::new(Utc::now());
        record.attention = attention;
        record.meditation = meditation;
        record.signal_quality = signal;
        DecoderEvent::packet(record.kind().unwrap(), record)
    }

    #[test]
    fn test_merge_keeps_previous_fields() {
        let mut tracker = TelemetryTracker::new();
        tracker.update(&computed(Some(50), Some(40), Some(0)));
        let readings = tracker.update(&computed(Some(55), None, None)).unwrap();

        assert_eq!(readings.attention, Some(55));
        assert_eq!(readings.meditation, Some(40));
        assert!(readings.has_contact());
    }

    #[test]
    fn test_counts() {
        let mut tracker = TelemetryTracker::new();
        assert!(tracker.is_stale());

        tracker.update(&DecoderEvent::ModeReference);
        tracker.update(&DecoderEvent::BadPacket(0));
        tracker.update(&computed(Some(1), None, Some(NO_CONTACT_SIGNAL)));
        tracker.update(&computed(None, Some(2), None));

        let mut raw = TelemetryRecord::new(Utc::now());
        raw.raw_wave_sample = Some(-5);
        tracker.update(&DecoderEvent::RawPacket(raw));

        let stats = tracker.stats_summary();
        assert_eq!(stats.raw_packets, 1);
        assert_eq!(stats.computed_packets, 2);
        assert_eq!(stats.bad_packets, 1);
        assert_eq!(stats.mode_references, 1);
        assert!(!stats.stale);
        assert!(!tracker.readings().has_contact());
        assert_eq!(tracker.readings().raw_wave_sample, Some(-5));
        assert!(stats.to_string().starts_with("Packets: 1 raw, 2 computed, 1 bad"));
    }
}
