//! Error types

use thiserror::Error;

/// Invalid configuration value
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("{name} must be greater than zero")]
    Zero { name: &'static str },
}

/// Serial transport failures
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to open serial port {port} at {baud_rate} baud")]
    Open {
        port: String,
        baud_rate: u32,
        #[source]
        source: tokio_serial::Error,
    },

    #[error("serial I/O error")]
    Io(#[from] std::io::Error),
}
