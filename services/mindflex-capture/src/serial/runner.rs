//! Serial runner - reads headset bytes, decodes them and forwards events

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, Notify};
use tracing::{debug, error, info, trace, warn};

use crate::device::DeviceStats;
use crate::stream::{DecoderEvent, StreamDecoder};

/// Runner that owns the decoder for one serial connection
pub struct SerialRunner {
    read_buffer_size: usize,
    send_wakeup: bool,
    running: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    stats: Arc<DeviceStats>,
}

impl SerialRunner {
    pub fn new(read_buffer_size: usize, send_wakeup: bool, stats: Arc<DeviceStats>) -> Self {
        Self {
            read_buffer_size: read_buffer_size.max(1),
            send_wakeup,
            running: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(Notify::new()),
            stats,
        }
    }

    /// Read from `io` until EOF, error, `stop()` or the event channel closes
    ///
    /// Works over any byte transport; the binary passes a `SerialStream`.
    pub async fn run<T>(&self, mut io: T, tx: mpsc::Sender<DecoderEvent>) -> Result<()>
    where
        T: AsyncRead + AsyncWrite + Unpin,
    {
        let mut decoder = StreamDecoder::with_stats(self.stats.clone());
        let mut buf = vec![0u8; self.read_buffer_size];

        self.running.store(true, Ordering::SeqCst);
        info!("Waiting for headset data...");
        let mut first_chunk = true;

        while self.running.load(Ordering::SeqCst) {
            let read = tokio::select! {
                read = io.read(&mut buf) => read,
                _ = self.shutdown.notified() => {
                    debug!("Runner stop requested");
                    break;
                }
            };

            let n = match read {
                Ok(0) => {
                    info!("Serial stream closed");
                    break;
                }
                Ok(n) => n,
                Err(e) => {
                    error!("Error reading serial port: {}", e);
                    break;
                }
            };

            if first_chunk {
                info!("First bytes received from headset");
                first_chunk = false;
            }
            trace!("data: {}", hex::encode(&buf[..n]));

            let events = decoder.feed(&buf[..n]);

            if let Some(command) = decoder.take_wakeup_command() {
                if self.send_wakeup {
                    io.write_all(&command)
                        .await
                        .context("Failed to write wakeup command")?;
                    io.flush().await.context("Failed to flush wakeup command")?;
                    info!("Sent wakeup command {}", hex::encode(command));
                } else {
                    debug!("Wakeup command disabled, headset stays in mode 0x00");
                }
            }

            let mut closed = false;
            for event in events {
                if tx.send(event).await.is_err() {
                    warn!("Event channel closed, stopping runner");
                    closed = true;
                    break;
                }
            }
            if closed {
                break;
            }
        }

        self.running.store(false, Ordering::SeqCst);
        decoder.reset();

        info!("Runner stopped. {}", self.stats);
        Ok(())
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.notify_one();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> &Arc<DeviceStats> {
        &self.stats
    }
}
