//! Mindflex Capture - ThinkGear EEG headset telemetry decoder
//!
//! Decodes the headset's serial byte stream into attention, meditation,
//! raw wave and band power records.

pub mod config;
pub mod device;
pub mod error;
pub mod mindflex;
pub mod serial;
pub mod stream;
pub mod telemetry_tracker;

pub use config::Config;
pub use error::{ConfigError, TransportError};
pub use mindflex::{EegSpectrum, PacketKind, TelemetryRecord};
pub use stream::{DecoderEvent, StreamDecoder};
