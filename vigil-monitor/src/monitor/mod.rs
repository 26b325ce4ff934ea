//! The monitor task owns the cumulative availability state and both
//! journals.
//!
//! Every mutation path -- push readings, stream readings, the retention
//! prune -- goes through one mpsc command channel into a single task, so
//! incremental updates and recomputes can never interleave. Handles are
//! cheap to clone and carry a oneshot reply channel per command.

use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use crate::api_client::types::StatsSnapshot;
use crate::availability::{CumulativeStats, Reading, StateSegment};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::journal::Journal;
use crate::retention::retain_recent;
use crate::status::format_hms;
use crate::tracing::prelude::*;

const COMMAND_BUFFER: usize = 64;

/// Commands into the monitor task. Each carries a reply channel so the
/// caller can await the serialized result.
enum MonitorCommand {
    ApplyReading {
        payload: Map<String, Value>,
        reply: oneshot::Sender<Result<Reading>>,
    },
    Stats {
        reply: oneshot::Sender<StatsSnapshot>,
    },
    Prune {
        reply: oneshot::Sender<()>,
    },
}

/// Cloneable handle for sending commands to the monitor task.
#[derive(Clone)]
pub struct MonitorHandle {
    command_tx: mpsc::Sender<MonitorCommand>,
}

impl MonitorHandle {
    /// Stamp and account one reading, durably appending it (and any
    /// completed segment) to the journals. Returns the stamped reading.
    pub async fn apply_reading(&self, payload: Map<String, Value>) -> Result<Reading> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(MonitorCommand::ApplyReading { payload, reply })
            .await
            .map_err(|_| Error::MonitorClosed)?;
        rx.await.map_err(|_| Error::MonitorClosed)?
    }

    /// Snapshot the cumulative stats.
    pub async fn stats(&self) -> Result<StatsSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(MonitorCommand::Stats { reply })
            .await
            .map_err(|_| Error::MonitorClosed)?;
        rx.await.map_err(|_| Error::MonitorClosed)
    }

    /// Run a retention pass over both journals and rebuild the stats.
    /// Completes when the pass has finished; per-journal errors are
    /// logged inside the task, not returned.
    pub async fn prune(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.command_tx
            .send(MonitorCommand::Prune { reply })
            .await
            .map_err(|_| Error::MonitorClosed)?;
        rx.await.map_err(|_| Error::MonitorClosed)
    }
}

/// The monitor task state.
pub struct Monitor {
    stats: CumulativeStats,
    readings: Journal,
    segments: Journal,
    retention_window: time::Duration,
    command_rx: mpsc::Receiver<MonitorCommand>,
}

impl Monitor {
    /// Create the monitor and its handle. The data directory is created
    /// if missing; stats start unset and are rebuilt by the startup
    /// prune.
    pub fn new(config: &Config) -> Result<(Self, MonitorHandle)> {
        std::fs::create_dir_all(&config.data_dir)?;

        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let monitor = Self {
            stats: CumulativeStats::default(),
            readings: Journal::new(config.data_dir.join("readings.log")),
            segments: Journal::new(config.data_dir.join("segments.log")),
            retention_window: config.retention_window(),
            command_rx,
        };
        Ok((monitor, MonitorHandle { command_tx }))
    }

    /// Run the command loop until shutdown or until all handles drop.
    pub async fn run(mut self, shutdown: CancellationToken) {
        trace!("Monitor task started.");

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(MonitorCommand::ApplyReading { payload, reply }) => {
                        let _ = reply.send(self.handle_apply(payload));
                    }
                    Some(MonitorCommand::Stats { reply }) => {
                        let _ = reply.send(self.snapshot());
                    }
                    Some(MonitorCommand::Prune { reply }) => {
                        self.handle_prune();
                        let _ = reply.send(());
                    }
                    None => break,
                },
                _ = shutdown.cancelled() => break,
            }
        }

        trace!("Monitor task stopped.");
    }

    fn handle_apply(&mut self, payload: Map<String, Value>) -> Result<Reading> {
        let reading = Reading::stamp(payload, OffsetDateTime::now_utc());
        let segment = self.stats.observe(reading.status(), reading.timestamp);

        // The reading append is the durability contract with the caller.
        self.readings.append(&reading)?;

        // The reading is already durable at this point; losing the
        // derived segment only degrades history, so it doesn't fail the
        // call.
        if let Some(segment) = segment {
            debug!(
                status = %segment.status,
                duration = %segment.duration,
                "Status changed, recording segment"
            );
            if let Err(e) = self.segments.append(&segment) {
                warn!(error = %e, "Failed to append segment");
            }
        }

        Ok(reading)
    }

    fn handle_prune(&mut self) {
        let cutoff = OffsetDateTime::now_utc() - self.retention_window;
        debug!(%cutoff, "Pruning journals");

        let readings: Vec<Reading> = self.readings.read_all();
        let kept = retain_recent(readings, cutoff, |r| r.timestamp);
        if let Err(e) = self.readings.rewrite(&kept) {
            warn!(error = %e, "Failed to rewrite readings journal");
        }
        // Rebuild from the kept set either way so stats track what the
        // retention policy says should exist. An empty set resets to
        // unset.
        self.stats = CumulativeStats::recompute(kept);

        let segments: Vec<StateSegment> = self.segments.read_all();
        let kept = retain_recent(segments, cutoff, |s| s.snapshot_at);
        if let Err(e) = self.segments.rewrite(&kept) {
            warn!(error = %e, "Failed to rewrite segments journal");
        }
    }

    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total_online_ms: self.stats.total_online_ms,
            total_offline_ms: self.stats.total_offline_ms,
            total_online: format_hms(self.stats.total_online_ms),
            total_offline: format_hms(self.stats.total_offline_ms),
            last_status: self.stats.last_status,
            last_timestamp: self
                .stats
                .last_timestamp
                .and_then(|t| t.format(&Rfc3339).ok()),
        }
    }
}
