//! Events produced by the stream decoder

use serde::Serialize;

use crate::mindflex::{PacketKind, TelemetryRecord};

/// One decoding outcome, delivered in scan order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum DecoderEvent {
    /// Headset is in mode 0x00 and needs the wakeup command
    ModeReference,
    /// Checksum mismatch; carries `computed & received`
    BadPacket(u8),
    RawPacket(TelemetryRecord),
    AllComputedPacket(TelemetryRecord),
    MeditationComputedPacket(TelemetryRecord),
    AttentionComputedPacket(TelemetryRecord),
}

impl DecoderEvent {
    pub fn packet(kind: PacketKind, record: TelemetryRecord) -> Self {
        match kind {
            PacketKind::Raw => Self::RawPacket(record),
            PacketKind::AllComputed => Self::AllComputedPacket(record),
            PacketKind::MeditationComputed => Self::MeditationComputedPacket(record),
            PacketKind::AttentionComputed => Self::AttentionComputedPacket(record),
        }
    }

    /// Decoded record, for packet events
    pub fn record(&self) -> Option<&TelemetryRecord> {
        match self {
            Self::RawPacket(r)
            | Self::AllComputedPacket(r)
            | Self::MeditationComputedPacket(r)
            | Self::AttentionComputedPacket(r) => Some(r),
            Self::ModeReference | Self::BadPacket(_) => None,
        }
    }

    pub fn kind(&self) -> Option<PacketKind> {
        match self {
            Self::RawPacket(_) => Some(PacketKind::Raw),
            Self::AllComputedPacket(_) => Some(PacketKind::AllComputed),
            Self::MeditationComputedPacket(_) => Some(PacketKind::MeditationComputed),
            Self::AttentionComputedPacket(_) => Some(PacketKind::AttentionComputed),
            Self::ModeReference | Self::BadPacket(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ModeReference => "mode00",
            Self::BadPacket(_) => "badPacket",
            _ => self.kind().map(PacketKind::as_str).unwrap_or("unknown"),
        }
    }
}
