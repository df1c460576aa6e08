//! Configuration loaded from environment variables

use std::str::FromStr;

use tracing::warn;

use crate::error::ConfigError;

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Serial device the headset is paired on
    pub serial_port: String,

    /// Serial baud rate
    pub baud_rate: u32,

    /// Bytes requested per serial read
    pub read_buffer_size: usize,

    /// Device ID string for identification
    pub device_id: String,

    /// Write the mode switch command when the headset reports mode 0x00
    pub send_wakeup: bool,

    /// Statistics logging interval in seconds
    pub stats_interval_secs: u64,

    /// Print classified events to stdout as JSON lines
    pub emit_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial_port: "/dev/rfcomm0".to_string(),
            baud_rate: 57_600,
            read_buffer_size: 512,
            device_id: format!("MINDFLEX-{:08X}", 1),
            send_wakeup: true,
            stats_interval_secs: 10,
            emit_json: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        match Self::try_from_env() {
            Ok(config) => config,
            Err(e) => {
                warn!("{}, using default configuration", e);
                Self::default()
            }
        }
    }

    /// Load configuration from environment variables
    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            serial_port: lookup("SERIAL_PORT").unwrap_or(defaults.serial_port),
            baud_rate: parse_var(&lookup, "BAUD_RATE")?.unwrap_or(defaults.baud_rate),
            read_buffer_size: parse_var(&lookup, "READ_BUFFER_SIZE")?
                .unwrap_or(defaults.read_buffer_size),
            device_id: lookup("DEVICE_ID").unwrap_or(defaults.device_id),
            send_wakeup: parse_bool(&lookup, "SEND_WAKEUP")?.unwrap_or(defaults.send_wakeup),
            stats_interval_secs: parse_var(&lookup, "STATS_INTERVAL_SECS")?
                .unwrap_or(defaults.stats_interval_secs),
            emit_json: parse_bool(&lookup, "EMIT_JSON")?.unwrap_or(defaults.emit_json),
        };

        if config.baud_rate == 0 {
            return Err(ConfigError::Zero { name: "BAUD_RATE" });
        }
        if config.read_buffer_size == 0 {
            return Err(ConfigError::Zero {
                name: "READ_BUFFER_SIZE",
            });
        }
        if config.stats_interval_secs == 0 {
            return Err(ConfigError::Zero {
                name: "STATS_INTERVAL_SECS",
            });
        }

        Ok(config)
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name, value }),
    }
}

fn parse_bool<F>(lookup: &F, name: &'static str) -> Result<Option<bool>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(ConfigError::InvalidValue { name, value }),
        },
    }
}
