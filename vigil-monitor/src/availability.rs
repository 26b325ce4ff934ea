//! Availability accounting: readings, completed state segments, and the
//! cumulative online/offline totals.
//!
//! The accounting state machine lives in [`CumulativeStats::observe`].
//! [`CumulativeStats::recompute`] replays a reading set through the same
//! machine from an empty state, so an incremental fold and a from-scratch
//! rebuild are equivalent by construction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::status::{Status, classify, format_hms};

/// One ingested device-status sample.
///
/// The timestamp is assigned by the daemon at receipt; a timestamp in the
/// submitted payload is never trusted. The remaining payload fields are
/// carried through untouched.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Reading {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Reading {
    /// Stamp a raw payload with the given receipt time. Any `timestamp`
    /// key in the payload is dropped so the server clock wins.
    pub fn stamp(mut fields: Map<String, Value>, timestamp: OffsetDateTime) -> Self {
        fields.remove("timestamp");
        Self { timestamp, fields }
    }

    /// The derived binary status of this reading.
    pub fn status(&self) -> Status {
        classify(self.fields.get("power"))
    }
}

/// A completed contiguous run of one status.
///
/// `snapshot_at` records when the segment was captured and drives
/// retention; since readings are stamped at receipt it coincides with
/// `end_at`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StateSegment {
    pub status: Status,

    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,

    #[serde(with = "time::serde::rfc3339")]
    pub end_at: OffsetDateTime,

    pub duration_ms: u64,

    /// Human-readable `HH:MM:SS` rendering of `duration_ms`.
    pub duration: String,

    #[serde(with = "time::serde::rfc3339")]
    pub snapshot_at: OffsetDateTime,
}

/// Running totals of online and offline time.
///
/// Invariant: `last_status` and `last_timestamp` are both set or both
/// unset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CumulativeStats {
    pub total_online_ms: u64,
    pub total_offline_ms: u64,
    pub last_status: Option<Status>,
    pub last_timestamp: Option<OffsetDateTime>,
}

impl CumulativeStats {
    /// Advance the accounting by one reading.
    ///
    /// Elapsed time since the previous reading is attributed to the
    /// *previous* status. Negative deltas (out-of-order or skewed
    /// timestamps) are clamped to zero. Returns the completed segment
    /// when the status flips after a nonzero run; at most one segment
    /// per reading.
    pub fn observe(&mut self, status: Status, timestamp: OffsetDateTime) -> Option<StateSegment> {
        let (Some(last_status), Some(last_timestamp)) = (self.last_status, self.last_timestamp)
        else {
            self.last_status = Some(status);
            self.last_timestamp = Some(timestamp);
            return None;
        };

        let delta_ms = (timestamp - last_timestamp).whole_milliseconds().max(0) as u64;
        if last_status.is_online() {
            self.total_online_ms += delta_ms;
        } else {
            self.total_offline_ms += delta_ms;
        }

        let segment = (status != last_status && delta_ms > 0).then(|| StateSegment {
            status: last_status,
            start_at: last_timestamp,
            end_at: timestamp,
            duration_ms: delta_ms,
            duration: format_hms(delta_ms),
            snapshot_at: timestamp,
        });

        self.last_status = Some(status);
        self.last_timestamp = Some(timestamp);
        segment
    }

    /// Rebuild totals from scratch by replaying a reading set.
    ///
    /// Readings are sorted by timestamp first -- source order is not
    /// trusted. Segment emission is suppressed; a rebuild reconstructs
    /// totals and last-status only, it never re-records history.
    pub fn recompute(mut readings: Vec<Reading>) -> Self {
        readings.sort_by_key(|r| r.timestamp);
        let mut stats = Self::default();
        for reading in &readings {
            let _ = stats.observe(reading.status(), reading.timestamp);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn reading(power: Value, timestamp: OffsetDateTime) -> Reading {
        let mut fields = Map::new();
        fields.insert("power".to_string(), power);
        Reading { timestamp, fields }
    }

    const T0: OffsetDateTime = datetime!(2026-08-24 12:00:00 UTC);

    #[test]
    fn first_reading_sets_state_without_attribution() {
        let mut stats = CumulativeStats::default();
        let segment = stats.observe(Status::Offline, T0);

        assert!(segment.is_none());
        assert_eq!(stats.total_online_ms, 0);
        assert_eq!(stats.total_offline_ms, 0);
        assert_eq!(stats.last_status, Some(Status::Offline));
        assert_eq!(stats.last_timestamp, Some(T0));
    }

    #[test]
    fn attributes_elapsed_time_to_previous_status() {
        let mut stats = CumulativeStats::default();
        stats.observe(Status::Online, T0);
        stats.observe(Status::Online, T0 + time::Duration::seconds(7));

        assert_eq!(stats.total_online_ms, 7_000);
        assert_eq!(stats.total_offline_ms, 0);
    }

    #[test]
    fn negative_delta_is_clamped_to_zero() {
        let mut stats = CumulativeStats::default();
        stats.observe(Status::Online, T0);
        let segment = stats.observe(Status::Offline, T0 - time::Duration::seconds(5));

        assert_eq!(stats.total_online_ms, 0);
        assert_eq!(stats.total_offline_ms, 0);
        // Zero-length runs never produce a segment.
        assert!(segment.is_none());
        assert_eq!(stats.last_status, Some(Status::Offline));
    }

    #[test]
    fn same_status_does_not_emit_segment() {
        let mut stats = CumulativeStats::default();
        stats.observe(Status::Online, T0);
        let segment = stats.observe(Status::Online, T0 + time::Duration::seconds(3));
        assert!(segment.is_none());
    }

    #[test]
    fn offline_then_online_then_offline_accounts_both_runs() {
        let mut stats = CumulativeStats::default();

        assert!(stats.observe(Status::Offline, T0).is_none());

        let first = stats
            .observe(Status::Online, T0 + time::Duration::seconds(5))
            .expect("transition should emit a segment");
        assert_eq!(stats.total_offline_ms, 5_000);
        assert_eq!(stats.total_online_ms, 0);
        assert_eq!(first.status, Status::Offline);
        assert_eq!(first.start_at, T0);
        assert_eq!(first.end_at, T0 + time::Duration::seconds(5));
        assert_eq!(first.duration_ms, 5_000);
        assert_eq!(first.duration, "00:00:05");

        let second = stats
            .observe(Status::Offline, T0 + time::Duration::seconds(15))
            .expect("transition should emit a segment");
        assert_eq!(stats.total_online_ms, 10_000);
        assert_eq!(stats.total_offline_ms, 5_000);
        assert_eq!(second.status, Status::Online);
        assert_eq!(second.start_at, T0 + time::Duration::seconds(5));
        assert_eq!(second.end_at, T0 + time::Duration::seconds(15));
        assert_eq!(second.duration_ms, 10_000);
    }

    #[test]
    fn recompute_matches_incremental_fold() {
        let readings = vec![
            reading(json!(0), T0),
            reading(json!(1), T0 + time::Duration::seconds(5)),
            reading(json!("on"), T0 + time::Duration::seconds(9)),
            reading(json!("off"), T0 + time::Duration::seconds(15)),
            reading(json!(true), T0 + time::Duration::seconds(16)),
        ];

        let mut folded = CumulativeStats::default();
        for r in &readings {
            let _ = folded.observe(r.status(), r.timestamp);
        }

        let recomputed = CumulativeStats::recompute(readings);
        assert_eq!(recomputed, folded);
    }

    #[test]
    fn recompute_is_sort_independent() {
        let sorted = vec![
            reading(json!(1), T0),
            reading(json!(0), T0 + time::Duration::seconds(2)),
            reading(json!(1), T0 + time::Duration::seconds(10)),
            reading(json!(0), T0 + time::Duration::seconds(11)),
        ];
        let shuffled = vec![
            sorted[2].clone(),
            sorted[0].clone(),
            sorted[3].clone(),
            sorted[1].clone(),
        ];

        assert_eq!(
            CumulativeStats::recompute(shuffled),
            CumulativeStats::recompute(sorted)
        );
    }

    #[test]
    fn recompute_of_empty_set_is_unset() {
        let stats = CumulativeStats::recompute(Vec::new());
        assert_eq!(stats, CumulativeStats::default());
        assert!(stats.last_status.is_none());
        assert!(stats.last_timestamp.is_none());
    }

    #[test]
    fn stamp_discards_client_supplied_timestamp() {
        let mut fields = Map::new();
        fields.insert("power".to_string(), json!(1));
        fields.insert("timestamp".to_string(), json!("1999-01-01T00:00:00Z"));

        let stamped = Reading::stamp(fields, T0);
        assert_eq!(stamped.timestamp, T0);
        assert!(!stamped.fields.contains_key("timestamp"));
    }

    #[test]
    fn reading_round_trips_through_json() {
        let line = serde_json::to_string(&reading(json!(1), T0)).unwrap();
        let back: Reading = serde_json::from_str(&line).unwrap();
        assert_eq!(back.timestamp, T0);
        assert_eq!(back.status(), Status::Online);
    }
}
