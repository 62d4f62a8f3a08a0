//! Log output for the CLI
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary (or the embedding application).

use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install a fmt subscriber; `RUST_LOG` takes precedence over `verbosity`
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("quickhot={}", level_for(verbosity))));

    // A subscriber may already be set when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
