//! ThinkGear payload parser

use chrono::{DateTime, Utc};
use tracing::trace;

use super::types::{EegSpectrum, FieldCode, TelemetryRecord, EEG_POWER_LEN};

/// Parse a validated frame payload, stamped with the current time
pub fn parse_payload(payload: &[u8]) -> TelemetryRecord {
    parse_payload_at(payload, Utc::now())
}

/// Parse a validated frame payload into a telemetry record
///
/// Fields are read left to right; a repeated code overwrites the earlier value.
/// Unknown codes are skipped one byte at a time. A field whose value runs past
/// the end of the payload is dropped and parsing stops there.
pub fn parse_payload_at(payload: &[u8], timestamp: DateTime<Utc>) -> TelemetryRecord {
    let mut record = TelemetryRecord::new(timestamp);
    let mut pos = 0;

    while pos < payload.len() {
        let code = FieldCode::from(payload[pos]);
        pos += 1;

        let width = code.value_len();
        let Some(value) = payload.get(pos..pos + width) else {
            trace!(
                "Truncated field {:?}: need {} bytes, {} left",
                code,
                width,
                payload.len() - pos
            );
            break;
        };
        pos += width;

        match code {
            FieldCode::Extended => record.extended_count += 1,
            FieldCode::SignalQuality => record.signal_quality = Some(value[0]),
            FieldCode::Attention => record.attention = Some(value[0]),
            FieldCode::Meditation => record.meditation = Some(value[0]),
            FieldCode::BlinkStrength => record.blink_strength = Some(value[0]),
            FieldCode::Raw8Bit => record.raw_8bit = Some(value[0]),
            FieldCode::RawWave => {
                // First byte is the value length, always 2
                record.raw_wave_sample = Some(i16::from_be_bytes([value[1], value[2]]));
            }
            FieldCode::EegPower => record.eeg_spectrum = Some(parse_eeg_spectrum(value)),
            FieldCode::Unknown => {}
        }
    }

    record
}

/// Decode the 24-byte ASIC EEG power block into eight band powers
pub fn parse_eeg_spectrum(data: &[u8]) -> EegSpectrum {
    debug_assert_eq!(data.len(), EEG_POWER_LEN);

    EegSpectrum {
        delta: read_u24(data, 0),
        theta: read_u24(data, 3),
        lo_alpha: read_u24(data, 6),
        hi_alpha: read_u24(data, 9),
        lo_beta: read_u24(data, 12),
        hi_beta: read_u24(data, 15),
        lo_gamma: read_u24(data, 18),
        mid_gamma: read_u24(data, 21),
    }
}

/// Read a 3-byte big-endian unsigned integer
fn read_u24(data: &[u8], offset: usize) -> u32 {
    ((data[offset] as u32) << 16) | ((data[offset + 1] as u32) << 8) | (data[offset + 2] as u32)
}
