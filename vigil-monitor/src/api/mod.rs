//! HTTP API for ingesting readings and querying availability.

pub mod server;
pub mod v0;
