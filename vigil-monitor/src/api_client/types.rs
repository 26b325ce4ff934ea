//! API data transfer objects.
//!
//! These types define the API contract shared between the server and
//! clients.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::status::Status;

/// Cumulative availability snapshot.
///
/// Totals appear both as raw milliseconds and as `HH:MM:SS` strings.
/// `last_status`/`last_timestamp` are absent until the first reading
/// arrives.
#[derive(Clone, Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct StatsSnapshot {
    pub total_online_ms: u64,
    pub total_offline_ms: u64,
    pub total_online: String,
    pub total_offline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_status: Option<Status>,
    /// RFC 3339 timestamp of the most recent reading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_timestamp: Option<String>,
}
