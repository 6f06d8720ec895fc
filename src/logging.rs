//! Logging configuration using tracing
//!
//! Structured logging to stderr, filtered through `RUST_LOG`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber with the default `warn` filter
///
/// # Example RUST_LOG values
/// - `RUST_LOG=info` - path found / cache hit / depth level events
/// - `RUST_LOG=sixdegrees=debug` - per-node exploration and store activity
/// - `RUST_LOG=sixdegrees=trace,neynar=debug` - everything, including follow pages
///
/// # Errors
/// Returns an error if the subscriber has already been initialized
pub fn init() -> crate::Result<()> {
    init_with_default("warn")
}

/// Initialize with a fallback filter used when `RUST_LOG` is unset
pub fn init_with_default(default_directive: &str) -> crate::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .pretty(),
        )
        .try_init()
        .map_err(|e| {
            crate::SixDegreesError::Other(format!("Failed to initialize tracing: {}", e))
        })?;

    Ok(())
}

/// Initialize logging for tests (no-op if already initialized)
pub fn init_test() {
    let _ = init();
}
