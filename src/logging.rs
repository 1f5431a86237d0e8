//! Tracing subscriber setup
//!
//! Logs go to stderr so the conversation on stdout stays readable.
//! `RUST_LOG` takes precedence over the configured level.

use crate::config::LoggingConfig;
use crate::{AssistantError, Result};
use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is not set
#[must_use]
pub fn default_directive(config: &LoggingConfig, verbose: bool) -> String {
    let level = if verbose { "debug" } else { config.level.as_str() };
    format!("skyroute={level}")
}

/// Install the global subscriber; fails if one is already installed
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(config, verbose)))
        .map_err(|e| AssistantError::config(format!("invalid log filter: {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.format == "json" {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    installed.map_err(|e| AssistantError::config(format!("failed to initialise logging: {e}")))
}
