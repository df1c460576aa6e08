//! Serial transport for the headset link

mod port;
mod runner;

pub use port::open_serial;
pub use runner::SerialRunner;
