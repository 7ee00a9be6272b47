//! Tracing setup for trioctl
//!
//! Logs go to stderr; stdout carries only the report.
//! Precedence: RUST_LOG, then --verbose, then `log.level` from config.

use tracing_subscriber::EnvFilter;

/// Resolve the filter directive used when RUST_LOG is unset
pub fn default_directive(verbose: bool, configured: &str) -> String {
    if verbose {
        "debug".to_string()
    } else {
        configured.to_string()
    }
}

pub fn init(verbose: bool, configured: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, configured)));

    // A subscriber may already be installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
