//! Device manager - consumes decoder events for one headset

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::stream::DecoderEvent;
use crate::telemetry_tracker::TelemetryTracker;

use super::state::{DeviceState, DeviceStats};

/// Device manager aggregates events, prints them and reports statistics
pub struct DeviceManager {
    config: Config,
    device_state: Arc<DeviceState>,
    stats: Arc<DeviceStats>,
    tracker: TelemetryTracker,
}

impl DeviceManager {
    pub fn new(config: Config, device_state: Arc<DeviceState>, stats: Arc<DeviceStats>) -> Self {
        Self {
            config,
            device_state,
            stats,
            tracker: TelemetryTracker::new(),
        }
    }

    /// Run until the event channel closes
    pub async fn run(mut self, mut event_rx: mpsc::Receiver<DecoderEvent>) -> Result<()> {
        info!("Starting device manager for {}", self.device_state.device_id);

        let mut stats_interval =
            tokio::time::interval(Duration::from_secs(self.config.stats_interval_secs));
        stats_interval.tick().await;

        let stdout = std::io::stdout();

        loop {
            tokio::select! {
                event = event_rx.recv() => {
                    let Some(event) = event else {
                        info!("Event channel closed");
                        break;
                    };
                    self.tracker.update(&event);

                    match &event {
                        DecoderEvent::ModeReference => {
                            debug!("Mode 0x00 reference bytes received");
                        }
                        DecoderEvent::BadPacket(value) => {
                            debug!("Bad packet ({:02X})", value);
                        }
                        _ => {}
                    }

                    if self.config.emit_json && event.kind().is_some() {
                        let line = event_json(&self.device_state.device_id, &event)
                            .context("Failed to serialize event")?;
                        let mut out = stdout.lock();
                        if let Err(e) = writeln!(out, "{}", line) {
                            warn!("Failed to write event: {}", e);
                        }
                    }
                }
                _ = stats_interval.tick() => {
                    info!("[Stats] {}", self.stats);
                    info!("[Tracker] {}", self.tracker.stats_summary());
                    if self.device_state.is_connected() && self.tracker.is_stale() {
                        warn!("No packets from {} recently", self.device_state.device_id);
                    }
                }
            }
        }

        info!(
            "Device manager stopped. {}",
            self.tracker.stats_summary()
        );

        Ok(())
    }
}

/// Render an event as a single JSON object tagged with the device ID
pub fn event_json(device_id: &str, event: &DecoderEvent) -> serde_json::Result<String> {
    let mut value = serde_json::to_value(event)?;
    if let Value::Object(map) = &mut value {
        map.insert("deviceId".to_string(), Value::String(device_id.to_string()));
    }
    serde_json::to_string(&value)
}
