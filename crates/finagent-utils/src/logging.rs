//! Logging and tracing utilities

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber for the whole process.
///
/// The filter defaults to `info` and can be overridden with `RUST_LOG`
/// (for example `RUST_LOG=finagent_runtime=debug`). Call this once at
/// startup; a second call panics because the global subscriber is
/// already set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
