//! Structured logging for the server binaries.
//!
//! Uses `tracing-subscriber` with environment-based filtering: set
//! `RUST_LOG` to adjust verbosity, defaulting to `info`. Per-request
//! outcomes are logged at `trace` to keep the hot path quiet by
//! default.

use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global tracing subscriber.
///
/// Call once at startup, before any spans or events are emitted.
pub fn init_tracing() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
