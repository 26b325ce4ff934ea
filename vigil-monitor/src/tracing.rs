//! Tracing setup and a prelude for the common log macros.

/// Common tracing macros, imported as `use crate::tracing::prelude::*`.
pub mod prelude {
    pub use tracing::{debug, error, info, trace, warn};
}

/// Initialize the global subscriber.
///
/// Filtering follows `RUST_LOG` and defaults to `info`. When the process
/// runs under systemd a journald layer is attached alongside the terminal
/// formatter.
pub fn init() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    match tracing_journald::layer() {
        Ok(journald) => registry.with(journald).init(),
        Err(_) => registry.init(),
    }
}
