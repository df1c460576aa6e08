//! Streaming decoder: owns the backlog and drives the scanner

use std::sync::Arc;

use tracing::{debug, info};

use super::buffer::StreamBuffer;
use super::event::DecoderEvent;
use super::scanner::scan;
use crate::device::DeviceStats;
use crate::mindflex::WAKEUP_COMMAND;

/// Progress of the mode 0x00 -> 0x02 switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wakeup {
    Idle,
    Pending,
    Taken,
}

/// Decoder for one headset connection
///
/// Not synchronized; callers delivering bytes from several threads must
/// serialize calls themselves.
pub struct StreamDecoder {
    buffer: StreamBuffer,
    stats: Arc<DeviceStats>,
    wakeup: Wakeup,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::with_stats(Arc::new(DeviceStats::new()))
    }

    /// Create a decoder reporting into shared statistics
    pub fn with_stats(stats: Arc<DeviceStats>) -> Self {
        Self {
            buffer: StreamBuffer::with_capacity(512),
            stats,
            wakeup: Wakeup::Idle,
        }
    }

    pub fn stats(&self) -> &Arc<DeviceStats> {
        &self.stats
    }

    /// Bytes held back waiting for the rest of a frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Append a chunk and collect every event it completes
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<DecoderEvent> {
        let mut events = Vec::new();
        self.feed_with(chunk, |event| events.push(event));
        events
    }

    /// Append a chunk and hand each completed event to `sink`, in scan order
    pub fn feed_with<F>(&mut self, chunk: &[u8], mut sink: F)
    where
        F: FnMut(DecoderEvent),
    {
        self.buffer.append(chunk);
        self.stats.record_bytes(chunk.len());

        loop {
            let outcome = scan(self.buffer.as_slice());
            if outcome.is_idle() {
                break;
            }
            self.buffer.consume(outcome.consumed);
            self.stats.record_noise(outcome.skipped);
            if outcome.frame_decoded {
                self.stats.record_frame();
            }

            if let Some(event) = outcome.event {
                self.observe(&event);
                sink(event);
            }
        }
    }

    /// Wakeup command to write, returned once after the first mode marker
    pub fn take_wakeup_command(&mut self) -> Option<[u8; 6]> {
        if self.wakeup == Wakeup::Pending {
            self.wakeup = Wakeup::Taken;
            Some(WAKEUP_COMMAND)
        } else {
            None
        }
    }

    /// Drop any partial frame, e.g. after a disconnect
    pub fn reset(&mut self) {
        if !self.buffer.is_empty() {
            debug!("Discarding {} buffered bytes", self.buffer.len());
        }
        self.buffer.clear();
    }

    fn observe(&mut self, event: &DecoderEvent) {
        match event {
            DecoderEvent::ModeReference => {
                self.stats.record_mode_reference();
                if self.wakeup == Wakeup::Idle {
                    info!("Headset in mode 0x00, requesting switch to raw output");
                    self.wakeup = Wakeup::Pending;
                }
            }
            DecoderEvent::BadPacket(_) => self.stats.record_bad_packet(),
            other => {
                if let Some(kind) = other.kind() {
                    self.stats.record_packet(kind);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mindflex::{encode_frame, PacketKind};
    use chrono::{DateTime, Utc};

    /// Zero timestamps so events decoded at different times compare equal
    fn strip(events: Vec<DecoderEvent>) -> Vec<DecoderEvent> {
        events
            .into_iter()
            .map(|event| {
                if let (Some(kind), Some(mut record)) = (event.kind(), event.record().cloned()) {
                    record.timestamp = DateTime::<Utc>::default();
                    DecoderEvent::packet(kind, record)
                } else {
                    event
                }
            })
            .collect()
    }

    fn stream() -> Vec<u8> {
        let mut bytes = vec![0x01, 0x02];
        bytes.extend(encode_frame(&[0x04, 0x32]));
        bytes.extend(encode_frame(&[0x04, 0x32, 0x05, 0x28]));
        bytes.push(0x7F);
        bytes.extend(encode_frame(&[0x80, 0x02, 0x01, 0x2C]));
        bytes.extend(encode_frame(&[0x02, 0xC8]));
        bytes.extend(encode_frame(&[0x05, 0x1E]));
        bytes
    }

    #[test]
    fn test_whole_stream() {
        let mut decoder = StreamDecoder::new();
        let events = decoder.feed(&stream());
        let kinds: Vec<_> = events.iter().map(|e| e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                Some(PacketKind::AttentionComputed),
                Some(PacketKind::AllComputed),
                Some(PacketKind::Raw),
                Some(PacketKind::MeditationComputed),
            ]
        );
        assert_eq!(events[2].record().unwrap().raw_wave_sample, Some(300));
        assert_eq!(decoder.buffered(), 0);

        let stats = decoder.stats();
        assert_eq!(stats.get_frames(), 5);
        assert_eq!(stats.get_noise(), 3);
        assert_eq!(stats.get_raw_packets(), 1);
        assert_eq!(stats.get_computed_packets(), 3);
    }

    #[test]
    fn test_split_delivery_equivalence() {
        let bytes = stream();
        let expected = strip(StreamDecoder::new().feed(&bytes));

        for split in 0..=bytes.len() {
            let mut decoder = StreamDecoder::new();
            let mut events = decoder.feed(&bytes[..split]);
            events.extend(decoder.feed(&bytes[split..]));
            assert_eq!(strip(events), expected, "split at {}", split);
        }

        let mut decoder = StreamDecoder::new();
        let mut events = Vec::new();
        for b in &bytes {
            events.extend(decoder.feed(std::slice::from_ref(b)));
        }
        assert_eq!(strip(events), expected);
    }

    #[test]
    fn test_partial_frame_is_held() {
        let frame = encode_frame(&[0x04, 0x32]);
        let mut decoder = StreamDecoder::new();
        assert!(decoder.feed(&frame[..4]).is_empty());
        assert_eq!(decoder.buffered(), 4);

        let events = decoder.feed(&frame[4..]);
        assert_eq!(events.len(), 1);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_wakeup_requested_once() {
        let mut decoder = StreamDecoder::new();
        assert_eq!(decoder.take_wakeup_command(), None);

        let events = decoder.feed(&[0xE0, 0xE0]);
        assert_eq!(events, vec![DecoderEvent::ModeReference]);
        assert_eq!(
            decoder.take_wakeup_command(),
            Some([0x00, 0xF8, 0x00, 0x00, 0x00, 0xE0])
        );
        assert_eq!(decoder.take_wakeup_command(), None);

        let events = decoder.feed(&[0xE0, 0xE0, 0xE0, 0xE0]);
        assert_eq!(events.len(), 2);
        assert_eq!(decoder.take_wakeup_command(), None);
        assert_eq!(decoder.stats().get_mode_references(), 3);
    }

    #[test]
    fn test_bad_packet_then_resume() {
        let mut bad = encode_frame(&[0x04, 0x32]);
        let last = bad.len() - 1;
        bad[last] = bad[last].wrapping_add(1);

        let mut decoder = StreamDecoder::new();
        let events = decoder.feed(&bad);
        assert_eq!(events, vec![DecoderEvent::BadPacket(0xC9 & 0xCA)]);
        assert_eq!(decoder.buffered(), 0);

        let events = decoder.feed(&encode_frame(&[0x05, 0x28]));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), Some(PacketKind::MeditationComputed));
        assert_eq!(decoder.stats().get_bad_packets(), 1);
    }

    #[test]
    fn test_empty_frame_emits_nothing() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.feed(&[0xAA, 0xAA, 0x00, 0xFF]).is_empty());
        assert_eq!(decoder.stats().get_frames(), 1);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_lone_sync_makes_progress() {
        let mut decoder = StreamDecoder::new();
        assert!(decoder.feed(&[0xAA, 0x00, 0xAA, 0x13, 0xAA]).is_empty());
        assert_eq!(decoder.buffered(), 1);

        let mut rest = vec![0x42];
        rest.extend(encode_frame(&[0x04, 0x01]));
        let events = decoder.feed(&rest);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].record().unwrap().attention, Some(1));
    }

    #[test]
    fn test_reset_discards_partial() {
        let mut decoder = StreamDecoder::new();
        decoder.feed(&[0xAA, 0xAA, 0x10, 0x04]);
        decoder.reset();
        assert_eq!(decoder.buffered(), 0);
    }
}
