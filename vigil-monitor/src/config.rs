//! Daemon configuration from environment variables.
//!
//! Every setting has a default so the daemon starts with no environment
//! at all. A value that fails to parse falls back to its default with a
//! logged warning rather than aborting startup.

use std::env;
use std::path::PathBuf;

use crate::tracing::prelude::*;

pub const DEFAULT_PORT: u16 = 7871;
pub const DEFAULT_RETENTION_DAYS: f64 = 7.0;

/// Upper bound on the retention window (100 years). Anything past this
/// is misconfiguration, not intent, and would overflow the duration
/// math long before it mattered.
pub const MAX_RETENTION_DAYS: f64 = 36_500.0;
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyUSB0";
pub const DEFAULT_SERIAL_BAUD: u32 = 115_200;
pub const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port.
    pub port: u16,

    /// Maximum record age before pruning, in days. Strictly positive.
    pub retention_days: f64,

    /// Serial device path for the hardware link.
    pub serial_port: String,

    /// Serial line speed for the hardware link.
    pub serial_baud: u32,

    /// Directory holding the readings and segments journals.
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            retention_days: DEFAULT_RETENTION_DAYS,
            serial_port: DEFAULT_SERIAL_PORT.to_string(),
            serial_baud: DEFAULT_SERIAL_BAUD,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl Config {
    /// Load configuration from `VIGIL_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            port: env_parse("VIGIL_PORT", DEFAULT_PORT),
            retention_days: retention_days(env::var("VIGIL_RETENTION_DAYS").ok().as_deref()),
            serial_port: env::var("VIGIL_SERIAL_PORT")
                .unwrap_or_else(|_| DEFAULT_SERIAL_PORT.to_string()),
            serial_baud: env_parse("VIGIL_SERIAL_BAUD", DEFAULT_SERIAL_BAUD),
            data_dir: env::var("VIGIL_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR)),
        }
    }

    /// Retention window as a duration. Never panics: a window that
    /// cannot be represented falls back to the default.
    pub fn retention_window(&self) -> time::Duration {
        time::Duration::checked_seconds_f64(self.retention_days * 86_400.0)
            .unwrap_or_else(|| time::Duration::days(DEFAULT_RETENTION_DAYS as i64))
    }
}

/// Parse a retention-days value; zero, negative, non-finite, absurdly
/// large, and unparseable values all fall back to the default.
fn retention_days(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return DEFAULT_RETENTION_DAYS;
    };
    match raw.trim().parse::<f64>() {
        Ok(days) if days.is_finite() && days > 0.0 && days <= MAX_RETENTION_DAYS => days,
        _ => {
            warn!(
                value = raw,
                default = DEFAULT_RETENTION_DAYS,
                "Invalid VIGIL_RETENTION_DAYS, using default"
            );
            DEFAULT_RETENTION_DAYS
        }
    }
}

fn env_parse<T: std::str::FromStr + std::fmt::Display + Copy>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, %default, "Invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}
