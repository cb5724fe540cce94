//! Logging setup.
//!
//! Structured logs go to stderr so they never mix with command output.
//! `RUST_LOG` overrides the configured level.

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
