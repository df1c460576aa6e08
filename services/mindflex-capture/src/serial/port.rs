//! Serial port access

use tokio_serial::{ClearBuffer, SerialPort, SerialPortBuilderExt, SerialStream};
use tracing::{debug, info};

use crate::error::TransportError;

/// Open the headset's serial port for async I/O
pub fn open_serial(path: &str, baud_rate: u32) -> Result<SerialStream, TransportError> {
    info!("Opening serial port {} at {} baud", path, baud_rate);

    let port = tokio_serial::new(path, baud_rate)
        .open_native_async()
        .map_err(|source| TransportError::Open {
            port: path.to_string(),
            baud_rate,
            source,
        })?;

    // Stale bytes from before the open would only be skipped as noise
    if let Err(e) = port.clear(ClearBuffer::Input) {
        debug!("Could not clear serial input buffer: {}", e);
    }

    Ok(port)
}
