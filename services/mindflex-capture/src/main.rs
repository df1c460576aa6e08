//! Mindflex Capture - ThinkGear EEG headset over a serial link
//!
//! Reads the headset's byte stream, decodes framed packets and prints
//! classified telemetry as JSON lines.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use mindflex_capture::device::{DeviceManager, DeviceState, DeviceStats};
use mindflex_capture::serial::{open_serial, SerialRunner};
use mindflex_capture::{Config, DecoderEvent};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("===========================================");
    info!("   Mindflex Capture");
    info!("   ThinkGear serial telemetry decoder");
    info!("===========================================");

    let config = Config::from_env();

    info!("Configuration:");
    info!("  Serial port: {}", config.serial_port);
    info!("  Baud rate: {}", config.baud_rate);
    info!("  Read buffer: {} bytes", config.read_buffer_size);
    info!("  Device ID: {}", config.device_id);
    info!("  Send wakeup: {}", config.send_wakeup);

    let port = open_serial(&config.serial_port, config.baud_rate)
        .with_context(|| format!("Cannot open headset on {}", config.serial_port))?;

    let device_state = Arc::new(DeviceState::new(
        config.device_id.clone(),
        config.serial_port.clone(),
        config.baud_rate,
    ));
    let stats = Arc::new(DeviceStats::new());

    let (event_tx, event_rx) = mpsc::channel::<DecoderEvent>(1024);

    let runner = Arc::new(SerialRunner::new(
        config.read_buffer_size,
        config.send_wakeup,
        stats.clone(),
    ));

    device_state.set_connected(true);
    let runner_handle = {
        let runner = runner.clone();
        tokio::spawn(async move { runner.run(port, event_tx).await })
    };

    let manager = DeviceManager::new(config.clone(), device_state.clone(), stats.clone());
    let manager_handle = tokio::spawn(manager.run(event_rx));

    info!("===========================================");
    info!("  Capturing... Press Ctrl+C to stop.");
    info!("===========================================");

    {
        let runner = runner.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, shutting down");
                runner.stop();
            }
        });
    }

    match runner_handle.await {
        Ok(Ok(())) => info!("Serial runner finished"),
        Ok(Err(e)) => error!("Serial runner failed: {:#}", e),
        Err(e) => error!("Serial runner panicked: {}", e),
    }
    device_state.set_connected(false);

    // Runner dropped its sender; manager drains remaining events and exits
    match manager_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Device manager failed: {:#}", e),
        Err(e) => error!("Device manager panicked: {}", e),
    }

    info!("Shutdown complete. {}", stats);
    Ok(())
}
