//! Structured logging initialization.
//!
//! No teacher equivalent — the teacher logs via bare `eprintln!`/progress
//! bars. Grounded on `tracing` + `tracing-subscriber` (`env-filter`), the
//! structured-logging stack carried over from the pack's `omgpointless-aspy`
//! repo. Honors `RUST_LOG`, defaulting to `info` for this crate and `warn`
//! elsewhere.

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. Call once from `main()`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,echomine=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
