//! Diagnostics go to stderr; stdout is reserved for protocol responses.
//!
//! The filter comes from `ATTENDANCED_LOG`, then `RUST_LOG`, then `info`.

use std::io;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "ATTENDANCED_LOG";

fn build_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init_logging() {
    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .compact();

    // A second init (tests embedding the daemon) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(build_filter())
        .with(layer)
        .try_init();
}
