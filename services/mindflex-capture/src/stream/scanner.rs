//! Frame scanner
//!
//! Walks the backlog looking for either the mode marker (`E0 E0`) or a sync
//! marker (`AA AA`) followed by length, payload and checksum:
//!
//! ```text
//! AA AA | len | payload[len] | checksum
//! ```
//!
//! One call produces at most one event. Bytes that cannot start a marker are
//! skipped one at a time inside the call. An incomplete frame stops the scan
//! at its first sync byte so alignment survives until more bytes arrive.

use tracing::{debug, trace};

use super::event::DecoderEvent;
use crate::mindflex::{check_checksum, parse_payload, MODE_MARKER, SYNC};

/// Result of one scan pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScanOutcome {
    /// Bytes the caller should drop from the front of the backlog
    pub consumed: usize,
    /// Noise bytes skipped before the marker (included in `consumed`)
    pub skipped: usize,
    /// Event produced by this pass, if any
    pub event: Option<DecoderEvent>,
    /// A frame with a valid checksum was decoded (even if it produced no event)
    pub frame_decoded: bool,
}

impl ScanOutcome {
    fn skip_only(n: usize) -> Self {
        Self {
            consumed: n,
            skipped: n,
            ..Self::default()
        }
    }

    /// Nothing left to do until more bytes arrive
    pub fn is_idle(&self) -> bool {
        self.consumed == 0 && self.event.is_none()
    }
}

/// Scan the backlog from its start
pub fn scan(buf: &[u8]) -> ScanOutcome {
    let mut pos = 0;

    while buf.len() - pos >= 2 {
        let (b0, b1) = (buf[pos], buf[pos + 1]);

        if b0 == MODE_MARKER && b1 == MODE_MARKER {
            return ScanOutcome {
                consumed: pos + 2,
                skipped: pos,
                event: Some(DecoderEvent::ModeReference),
                frame_decoded: false,
            };
        }

        if b0 == SYNC && b1 == SYNC {
            let Some(&len) = buf.get(pos + 2) else {
                break;
            };
            let len = len as usize;
            let payload_start = pos + 3;
            let frame_end = payload_start + len + 1;
            if buf.len() < frame_end {
                trace!("Incomplete frame: need {} bytes, have {}", frame_end - pos, buf.len() - pos);
                break;
            }

            let payload = &buf[payload_start..payload_start + len];
            let received = buf[payload_start + len];

            return match check_checksum(payload, received) {
                Err(computed) => {
                    debug!(
                        "Bad packet: checksum {:02X}, expected {:02X}, {} payload bytes",
                        received, computed, len
                    );
                    ScanOutcome {
                        consumed: frame_end,
                        skipped: pos,
                        event: Some(DecoderEvent::BadPacket(computed & received)),
                        frame_decoded: false,
                    }
                }
                Ok(()) => {
                    let record = parse_payload(payload);
                    let event = record.kind().map(|kind| DecoderEvent::packet(kind, record));
                    ScanOutcome {
                        consumed: frame_end,
                        skipped: pos,
                        event,
                        frame_decoded: true,
                    }
                }
            };
        }

        // Noise, or a lone sync byte that cannot start a frame
        pos += 1;
    }

    if pos > 0 {
        trace!("Skipped {} noise bytes", pos);
    }
    ScanOutcome::skip_only(pos)
}
