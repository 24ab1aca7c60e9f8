//! Log subscriber setup for the command-line tool.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! binary's job. `RUST_LOG` takes precedence over the configured level.

use std::error::Error;
use tracing_subscriber::EnvFilter;

/// Level used when neither `RUST_LOG` nor the settings name a valid one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Build the filter for `level`, honouring `RUST_LOG` first.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Install the global subscriber.
///
/// Verbose output adds timestamps and worker thread names; the default
/// output is terse.
pub fn init(level: &str, verbose: bool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(false)
        .with_writer(std::io::stderr);

    if verbose {
        builder.with_thread_names(true).try_init()
    } else {
        builder.without_time().try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_falls_back() {
        // must not panic on garbage directives
        let filter = env_filter("definitely=not=a=level");
        let _ = filter.to_string();
    }
}
