//! Tracing subscriber setup.

use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Parse a configured log level, `None` if it is not a recognised level.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    let level = level.trim();
    if level.is_empty() {
        return None;
    }
    level.parse().ok()
}

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise the filter comes from `log_level`.
/// An unrecognised `log_level` falls back to `info` with a warning.
pub fn init(log_level: &str) {
    let (filter, unrecognised) = select_filter(EnvFilter::try_from_default_env().ok(), log_level);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if unrecognised {
        warn!(log_level, "unrecognised log level, falling back to info");
    }
}

/// Pick the filter to install. The flag is set only when `log_level` was
/// consulted and could not be parsed.
fn select_filter(from_env: Option<EnvFilter>, log_level: &str) -> (EnvFilter, bool) {
    if let Some(filter) = from_env {
        return (filter, false);
    }
    match parse_level(log_level) {
        Some(level) => (EnvFilter::new(level.to_string()), false),
        None => (EnvFilter::new(LevelFilter::INFO.to_string()), true),
    }
}
