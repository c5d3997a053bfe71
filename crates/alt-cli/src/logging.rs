//! Tracing subscriber setup

use crate::config::{LogConfig, LOG_ENV};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

/// Filter from `ALTTEXT_LOG`, falling back to the configured directive
///
/// # Errors
/// Fails if the configured directive does not parse.
pub fn env_filter(config: &LogConfig) -> anyhow::Result<EnvFilter> {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.filter)
            .with_context(|| format!("invalid log filter {:?}", config.filter)),
    }
}

/// Install the global subscriber; logs go to stderr
///
/// Returns `false` if a subscriber was already installed.
///
/// # Errors
/// Fails on a bad filter.
pub fn init(config: &LogConfig) -> anyhow::Result<bool> {
    let filter = env_filter(config)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    Ok(installed.is_ok())
}
