//! ThinkGear (Mindflex) packet protocol

mod checksum;
pub mod parser;
mod types;

pub use checksum::{check_checksum, compute_checksum};
pub use parser::{parse_eeg_spectrum, parse_payload, parse_payload_at};
pub use types::{EegSpectrum, FieldCode, PacketKind, TelemetryRecord, EEG_POWER_LEN};

/// Two-byte marker sent while the headset is in mode 0x00 (9600 baud, no raw output)
pub const MODE_MARKER: u8 = 0xE0;

/// Two-byte frame sync marker
pub const SYNC: u8 = 0xAA;

/// Command switching the headset from mode 0x00 to mode 0x02 (57600 baud, raw output)
pub const WAKEUP_COMMAND: [u8; 6] = [0x00, 0xF8, 0x00, 0x00, 0x00, 0xE0];

/// Frame overhead: two sync bytes, length byte, checksum byte
pub const FRAME_OVERHEAD: usize = 4;

/// Wrap a payload in sync bytes, length and checksum
///
/// Payloads longer than 255 bytes cannot be framed and are truncated.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let payload = &payload[..payload.len().min(u8::MAX as usize)];
    let mut frame = Vec::with_capacity(payload.len() + FRAME_OVERHEAD);
    frame.extend_from_slice(&[SYNC, SYNC, payload.len() as u8]);
    frame.extend_from_slice(payload);
    frame.push(compute_checksum(payload));
    frame
}
