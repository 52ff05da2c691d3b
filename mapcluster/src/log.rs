//! Tracing bootstrap.
//!
//! The library logs through `tracing` everywhere; this module gives
//! embedders and the CLI a one-call subscriber setup honoring `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber.
///
/// Filters from the `RUST_LOG` environment variable, defaulting to `info`
/// when unset. Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
    }
}
