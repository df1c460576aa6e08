//! ThinkGear telemetry data types

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Payload field codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FieldCode {
    SignalQuality = 0x02,
    Attention = 0x04,
    Meditation = 0x05,
    Raw8Bit = 0x06,
    BlinkStrength = 0x16,
    Extended = 0x55,
    RawWave = 0x80,
    EegPower = 0x83,
    Unknown = 0xFF,
}

impl From<u8> for FieldCode {
    fn from(code: u8) -> Self {
        match code {
            0x02 => Self::SignalQuality,
            0x04 => Self::Attention,
            0x05 => Self::Meditation,
            0x06 => Self::Raw8Bit,
            0x16 => Self::BlinkStrength,
            0x55 => Self::Extended,
            0x80 => Self::RawWave,
            0x83 => Self::EegPower,
            _ => Self::Unknown,
        }
    }
}

impl FieldCode {
    /// Number of value bytes following the code byte
    pub fn value_len(self) -> usize {
        match self {
            Self::Extended | Self::Unknown => 0,
            Self::SignalQuality
            | Self::Attention
            | Self::Meditation
            | Self::Raw8Bit
            | Self::BlinkStrength => 1,
            Self::RawWave => 3,
            Self::EegPower => EEG_POWER_LEN,
        }
    }
}

/// Size of the ASIC EEG power block (eight 3-byte bands)
pub const EEG_POWER_LEN: usize = 24;

/// Eight band powers, each an unsigned 24-bit value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EegSpectrum {
    pub delta: u32,
    pub theta: u32,
    pub lo_alpha: u32,
    pub hi_alpha: u32,
    pub lo_beta: u32,
    pub hi_beta: u32,
    pub lo_gamma: u32,
    pub mid_gamma: u32,
}

/// Decoded contents of one frame payload
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryRecord {
    /// When the payload was decoded
    pub timestamp: DateTime<Utc>,

    /// Number of extended-code bytes seen
    pub extended_count: u32,

    /// Poor-signal level, 0-255 (lower is better)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_quality: Option<u8>,

    /// Attention eSense, 0-100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attention: Option<u8>,

    /// Meditation eSense, 0-100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meditation: Option<u8>,

    /// Blink strength, 0-255
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blink_strength: Option<u8>,

    /// 8-bit raw sample
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_8bit: Option<u8>,

    /// Raw EEG wave sample (16-bit two's complement)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_wave_sample: Option<i16>,

    /// ASIC EEG band powers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eeg_spectrum: Option<EegSpectrum>,
}

impl TelemetryRecord {
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            extended_count: 0,
            signal_quality: None,
            attention: None,
            meditation: None,
            blink_strength: None,
            raw_8bit: None,
            raw_wave_sample: None,
            eeg_spectrum: None,
        }
    }

    /// Packet kind this record is reported as, if any
    pub fn kind(&self) -> Option<PacketKind> {
        PacketKind::classify(self)
    }
}

/// Kind of event a decoded record is emitted as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PacketKind {
    Raw,
    AllComputed,
    MeditationComputed,
    AttentionComputed,
}

impl PacketKind {
    /// Raw wave takes precedence; otherwise attention/meditation presence decides.
    /// Records with neither (signal or blink only) are not classified.
    pub fn classify(record: &TelemetryRecord) -> Option<Self> {
        if record.raw_wave_sample.is_some() {
            return Some(Self::Raw);
        }

        match (record.attention.is_some(), record.meditation.is_some()) {
            (true, true) => Some(Self::AllComputed),
            (false, true) => Some(Self::MeditationComputed),
            (true, false) => Some(Self::AttentionComputed),
            (false, false) => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "rawPacket",
            Self::AllComputed => "allComputedPacket",
            Self::MeditationComputed => "meditationComputedPacket",
            Self::AttentionComputed => "attentionComputedPacket",
        }
    }
}

impl std::fmt::Display for PacketKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TelemetryRecord {
        TelemetryRecord::new(Utc::now())
    }

    #[test]
    fn test_classify_raw_wins() {
        let mut r = record();
        r.raw_wave_sample = Some(-12);
        r.attention = Some(50);
        r.meditation = Some(40);
        assert_eq!(r.kind(), Some(PacketKind::Raw));
    }

    #[test]
    fn test_classify_computed() {
        let mut r = record();
        r.attention = Some(50);
        assert_eq!(r.kind(), Some(PacketKind::AttentionComputed));

        r.meditation = Some(40);
        assert_eq!(r.kind(), Some(PacketKind::AllComputed));

        r.attention = None;
        assert_eq!(r.kind(), Some(PacketKind::MeditationComputed));
    }

    #[test]
    fn test_classify_unclassified() {
        let mut r = record();
        r.signal_quality = Some(200);
        r.blink_strength = Some(80);
        r.eeg_spectrum = Some(EegSpectrum::default());
        assert_eq!(r.kind(), None);
    }

    #[test]
    fn test_field_code_widths() {
        assert_eq!(FieldCode::from(0x55).value_len(), 0);
        assert_eq!(FieldCode::from(0x04).value_len(), 1);
        assert_eq!(FieldCode::from(0x80).value_len(), 3);
        assert_eq!(FieldCode::from(0x83).value_len(), 24);
        assert_eq!(FieldCode::from(0x99), FieldCode::Unknown);
    }
}
