//! Headset connection state and event handling

mod manager;
mod state;

pub use manager::{event_json, DeviceManager};
pub use state::{DeviceState, DeviceStats};
