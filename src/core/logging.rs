//! Logging setup powered by `tracing-subscriber`
//!
//! Logs go to stderr so they never interleave with answers printed on stdout.

use tracing_subscriber::EnvFilter;

use crate::core::config::LoggingConfig;
use crate::core::error::{DatachatError, Result};

/// Crates whose debug output drowns out ours
const NOISY_TARGETS: &[(&str, &str)] = &[("hyper", "warn"), ("reqwest", "warn"), ("h2", "warn")];

/// Build the filter directive string for a base level
pub fn filter_directives(level: &str, debug: bool) -> String {
    let base = if debug { "debug" } else { level };
    let mut directives = vec![base.to_string()];
    for (target, lvl) in NOISY_TARGETS {
        directives.push(format!("{}={}", target, lvl));
    }
    directives.join(",")
}

/// Install the global subscriber
///
/// Calling this twice is harmless; the second call leaves the first
/// subscriber in place.
pub fn init_logging(config: &LoggingConfig, debug: bool) -> Result<()> {
    let directives = filter_directives(&config.level, debug);
    let filter = EnvFilter::try_new(&directives).map_err(|e| {
        DatachatError::config(format!("Invalid log filter '{}': {}", directives, e))
    })?;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_target(true)
        .try_init();

    tracing::trace!(filter = %directives, "logging initialized");
    Ok(())
}
