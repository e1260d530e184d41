//! Tracing initialization for tests and binaries
//!
//! Filtering comes from `RUST_LOG`, for example:
//! - `RUST_LOG=rustyftx=debug` - all debug output
//! - `RUST_LOG=rustyftx::sync=trace` - candidate search internals
//! - `RUST_LOG=rustyftx=info,rustyftx::decoder=debug` - mixed levels

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install a test-friendly subscriber, defaulting to `rustyftx=warn`
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_test_tracing() {
    static TRACING: Lazy<()> = Lazy::new(|| {
        // another harness may already own the global subscriber
        let _ = fmt()
            .with_env_filter(filter("rustyftx=warn"))
            .with_target(true)
            .with_line_number(true)
            .with_test_writer()
            .try_init();
    });

    Lazy::force(&TRACING);
}

/// Install the subscriber for binaries, defaulting to `rustyftx=info`
///
/// Call early in `main()`.
pub fn init_tracing() {
    let _ = fmt()
        .with_env_filter(filter("rustyftx=info"))
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .try_init();
}
