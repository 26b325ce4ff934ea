//! Status classification and duration formatting.
//!
//! Devices report their power state in whatever shape their firmware
//! happens to produce -- booleans, numbers, strings, sometimes nothing at
//! all. `classify` maps that zoo onto a binary status with a total rule:
//! anything unrecognizable counts as offline.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Derived binary device status.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Online,
    Offline,
}

impl Status {
    pub fn is_online(self) -> bool {
        self == Status::Online
    }

    fn from_bool(online: bool) -> Self {
        if online { Status::Online } else { Status::Offline }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Online => write!(f, "online"),
            Status::Offline => write!(f, "offline"),
        }
    }
}

/// Classify a raw `power` field. Never fails; unclassifiable input
/// (including a missing field) is offline.
///
/// Rules, first match wins: boolean is taken as-is; a number is online
/// iff nonzero; a string is online iff it equals `"on"` or `"1"` after
/// trimming and lowercasing.
pub fn classify(power: Option<&Value>) -> Status {
    let online = match power {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => {
            let s = s.trim().to_ascii_lowercase();
            s == "on" || s == "1"
        }
        _ => false,
    };
    Status::from_bool(online)
}

/// Format a millisecond count as `HH:MM:SS`. Hours are zero-padded to
/// two digits but unbounded above.
pub fn format_hms(ms: u64) -> String {
    let total_secs = ms / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
