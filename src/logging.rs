//! Structured logging via `tracing`.
//!
//! Events go to stderr so command output on stdout stays machine-readable.
//! `DOCVIEW_LOG` (or `RUST_LOG`) overrides the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::config::LoggingConfig;

/// Environment variable that overrides the configured filter.
pub const LOG_ENV: &str = "DOCVIEW_LOG";

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let _ = Registry::default()
        .with(build_env_filter(&config.level))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
