//! Device availability monitoring daemon.
//!
//! Ingests timestamped device-status readings from a push API and a
//! serial hardware link, persists them to append-only journals, and
//! keeps a running accounting of cumulative online vs offline time.

pub mod api;
pub mod api_client;
pub mod availability;
pub mod config;
pub mod error;
pub mod journal;
pub mod link;
pub mod monitor;
pub mod retention;
pub mod status;
pub mod tracing;
