//! Diagnostic logging to stderr via `tracing`.
//!
//! User-facing progress goes through `OutputContext`; this is for `--verbose`
//! and `CAPSULE_LOG=debug` troubleshooting.

use tracing_subscriber::EnvFilter;

/// Env var holding the filter directive, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "CAPSULE_LOG";

/// Pick the filter directive: `CAPSULE_LOG`, then `RUST_LOG`, then the
/// default (`debug` when verbose, else `warn`).
#[must_use]
pub fn filter_directive(verbose: bool, lookup: impl Fn(&str) -> Option<String>) -> String {
    [LOG_ENV, "RUST_LOG"]
        .iter()
        .filter_map(|key| lookup(key))
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| if verbose { "debug" } else { "warn" }.to_string())
}

/// Install the global subscriber. Safe to call once per process.
pub fn init(verbose: bool) {
    let directive = filter_directive(verbose, |key| std::env::var(key).ok());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
