//! Log output for host applications.

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, or by `default_filter`
/// (e.g. `"info"` or `"hearthcoach_session=debug"`) when `RUST_LOG` is unset.
///
/// Returns `false` if a global subscriber was already installed; that
/// subscriber is left alone.
pub fn init(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
