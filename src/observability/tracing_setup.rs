//! Subscriber installation for `tracing` diagnostics.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered at `level`.
///
/// `RUST_LOG` takes precedence when set. Returns `false` when a global
/// subscriber was already installed.
pub fn init_tracing(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
