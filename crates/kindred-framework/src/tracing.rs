//! Logging setup.
//!
//! The framework logs with `tracing` events carrying `kind`, `id` and
//! `signal` fields:
//!
//! - `info`: records created, updated and deleted, actor start and shutdown.
//! - `debug`: incoming requests, dispatched signals, write-through, searches.
//! - `warn`: failed requests and rolled back operations.
//!
//! ```bash
//! RUST_LOG=info cargo run -p kindred-sample
//! RUST_LOG=kindred_framework=debug cargo run -p kindred-sample
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
///
/// Panics if a global subscriber is already set, so call it once from `main`.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
