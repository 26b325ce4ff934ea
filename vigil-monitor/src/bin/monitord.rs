//! The vigil-monitord daemon.
//!
//! Wires the monitor task to its three drivers: the HTTP API, the
//! serial link, and the retention timer. No error from a driver
//! terminates the process; the daemon favors partial availability over
//! fail-fast.

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use vigil_monitor::config::Config;
use vigil_monitor::monitor::Monitor;
use vigil_monitor::{api, link, retention};

use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    vigil_monitor::tracing::init();

    let config = Config::from_env();
    info!(?config, "Starting vigil-monitord");

    let shutdown = CancellationToken::new();
    let (monitor, handle) = Monitor::new(&config)?;
    let monitor_task = tokio::spawn(monitor.run(shutdown.clone()));

    // The retention task prunes immediately on startup, which also
    // rebuilds the stats from the surviving journal.
    tokio::spawn(retention::task(handle.clone(), shutdown.clone()));
    tokio::spawn(link::task(config.clone(), handle.clone(), shutdown.clone()));

    tokio::select! {
        result = api::server::serve(config.port, handle, shutdown.clone()) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown requested");
        }
    }

    shutdown.cancel();
    let _ = monitor_task.await;

    Ok(())
}
