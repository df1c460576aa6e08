//! Byte stream decoding
//!
//! Bytes arrive from the serial link in arbitrary chunks:
//! 1. Append each chunk to the backlog
//! 2. Scan for the mode marker or a sync-framed packet, skipping noise
//! 3. Verify the frame checksum and parse its payload
//! 4. Emit one event per outcome and drop the consumed prefix

mod buffer;
mod decoder;
mod event;
pub mod scanner;

pub use buffer::StreamBuffer;
pub use decoder::StreamDecoder;
pub use event::DecoderEvent;
pub use scanner::{scan, ScanOutcome};
