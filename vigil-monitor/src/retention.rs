//! Retention pruning of the journals.
//!
//! The actual prune runs inside the monitor task so it is serialized
//! against incremental updates; this module provides the age filter and
//! the timer task that kicks the prune off once at startup and daily
//! thereafter. The timer is not persisted -- after a restart the daily
//! cadence is offset by process start time, which is acceptable.

use std::time::Duration;

use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;

use crate::monitor::MonitorHandle;
use crate::tracing::prelude::*;

const PRUNE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Keep only records whose retention timestamp is at or after `cutoff`.
pub fn retain_recent<T>(
    records: Vec<T>,
    cutoff: OffsetDateTime,
    timestamp: impl Fn(&T) -> OffsetDateTime,
) -> Vec<T> {
    records
        .into_iter()
        .filter(|record| timestamp(record) >= cutoff)
        .collect()
}

/// Periodic prune driver. Errors are logged and never propagated; a
/// failed prune is retried on the next tick.
pub async fn task(monitor: MonitorHandle, shutdown: CancellationToken) {
    trace!("Retention task started.");

    loop {
        if let Err(e) = monitor.prune().await {
            warn!(error = %e, "Retention prune failed");
        }

        tokio::select! {
            _ = tokio::time::sleep(PRUNE_INTERVAL) => {}
            _ = shutdown.cancelled() => break,
        }
    }

    trace!("Retention task stopped.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    const CUTOFF: OffsetDateTime = datetime!(2026-08-17 00:00:00 UTC);

    #[test]
    fn keeps_exactly_records_at_or_after_cutoff() {
        let records = vec![
            CUTOFF - time::Duration::seconds(1),
            CUTOFF,
            CUTOFF + time::Duration::seconds(1),
            CUTOFF - time::Duration::days(30),
        ];

        let kept = retain_recent(records, CUTOFF, |t| *t);
        assert_eq!(kept, vec![CUTOFF, CUTOFF + time::Duration::seconds(1)]);
    }

    #[test]
    fn pruning_twice_is_idempotent() {
        let records = vec![
            CUTOFF - time::Duration::hours(1),
            CUTOFF + time::Duration::hours(1),
            CUTOFF + time::Duration::hours(2),
        ];

        let once = retain_recent(records, CUTOFF, |t| *t);
        let twice = retain_recent(once.clone(), CUTOFF, |t| *t);
        assert_eq!(twice, once);
    }

    #[test]
    fn empty_input_stays_empty() {
        let kept: Vec<OffsetDateTime> = retain_recent(Vec::new(), CUTOFF, |t| *t);
        assert!(kept.is_empty());
    }
}
