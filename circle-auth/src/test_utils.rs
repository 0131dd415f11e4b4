// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helpers for tests of this crate and of crates building on it.

/// Install a `tracing` subscriber filtered by `RUST_LOG`, does nothing when it is not set.
pub fn setup_logging() {
    if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}
