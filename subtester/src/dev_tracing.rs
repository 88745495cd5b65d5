//! Tracing setup.
//!
//! Stdout carries the rendered messages, so every subscriber here writes
//! to stderr.

use tracing_subscriber::EnvFilter;

/// Initialize logging for the binaries.
///
/// `--verbose` forces `debug`; otherwise `RUST_LOG` is honoured and falls
/// back to `info`.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Development helper: initialize tracing subscriber when `RUST_LOG` is set.
///
/// Tests and benches can call `subtester::dev_tracing::init_tracing()` to
/// enable structured logging for debugging. This is a no-op when `RUST_LOG`
/// is not set or when a global subscriber is already installed.
pub fn init_tracing() {
    use std::env;

    if env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}
