//! Logging setup.
//!
//! Console output through `tracing-subscriber`, filtered by `RUST_LOG`
//! (defaults to `info`).

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter from a `RUST_LOG`-style directive string.
pub fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber has already been set.
pub fn init_logging() -> Result<(), TryInitError> {
    let directives = std::env::var("RUST_LOG").ok();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter(directives.as_deref()))
        .with(stdout_layer)
        .try_init()
}
