//! Hardware-link ingestion over a serial port.
//!
//! Opens the configured serial device, extracts frames with
//! [`codec::FrameCodec`], and feeds each decoded record to the monitor.
//! Link failures never take the daemon down; the push path and stats
//! query keep serving without the stream.

pub mod codec;

use tokio_serial::SerialPortBuilderExt;
use tokio_stream::StreamExt;
use tokio_util::codec::FramedRead;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::monitor::MonitorHandle;
use crate::tracing::prelude::*;

pub async fn task(config: Config, monitor: MonitorHandle, shutdown: CancellationToken) {
    trace!("Link task started.");

    let port = match tokio_serial::new(config.serial_port.as_str(), config.serial_baud)
        .open_native_async()
    {
        Ok(port) => {
            info!(
                port = %config.serial_port,
                baud = config.serial_baud,
                "Serial link opened"
            );
            port
        }
        Err(e) => {
            error!(port = %config.serial_port, error = %e, "Failed to open serial link");
            return;
        }
    };

    let mut frames = FramedRead::new(port, codec::FrameCodec::default());

    loop {
        tokio::select! {
            frame = frames.next() => match frame {
                Some(Ok(record)) => {
                    if let Err(e) = monitor.apply_reading(record).await {
                        warn!(error = %e, "Failed to apply stream reading");
                    }
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Serial read error");
                }
                None => {
                    warn!("Serial link closed");
                    break;
                }
            },
            _ = shutdown.cancelled() => break,
        }
    }

    trace!("Link task stopped.");
}
