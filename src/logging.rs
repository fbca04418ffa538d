//! Optional tracing subscriber setup.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! application's choice. These helpers install a `fmt` subscriber filtered
//! by `RUST_LOG` (falling back to the given level for the `twizzle` target).
//!
//! ```text
//! RUST_LOG=twizzle::runner=debug,twizzle::store=info
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Target prefix of every event the crate emits.
pub const TARGET_PREFIX: &str = "twizzle";

/// Environment variable consulted by [`init_from_env`].
pub const ENV_LOG_LEVEL: &str = "TWIZZLE_LOG_LEVEL";

/// Parse a log level string (case-insensitive).
#[must_use]
pub fn parse_level(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

fn filter_for(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{TARGET_PREFIX}={level}")))
}

/// Install a global `fmt` subscriber.
///
/// Returns `false` if a global subscriber was already set; calling twice is harmless.
pub fn init_tracing(level: Level) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter_for(level))
        .with_target(true)
        .try_init()
        .is_ok()
}

/// [`init_tracing`] with the level read from `TWIZZLE_LOG_LEVEL` (default `info`).
pub fn init_from_env() -> bool {
    let level = std::env::var(ENV_LOG_LEVEL)
        .ok()
        .and_then(|s| parse_level(&s))
        .unwrap_or(Level::INFO);
    init_tracing(level)
}
