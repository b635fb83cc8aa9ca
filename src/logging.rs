//! Tracing subscriber setup.
//!
//! Installs a compact `tracing-subscriber` formatter honoring
//! `RUST_LOG`. Safe to call more than once; only the first call wins.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize global structured logging for the process.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .ok();
}
