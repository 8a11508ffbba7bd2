//! Logging initialization
//!
//! Filter resolution order: command-line level, then `RUST_LOG`, then the
//! `[logging] level` TOML value.

use crate::config::LoggingConfig;
use crate::{Error, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pick the log filter directive from the available sources
pub fn resolve_log_filter(cli_level: Option<&str>, logging: &LoggingConfig) -> String {
    if let Some(level) = cli_level.filter(|l| !l.trim().is_empty()) {
        return level.to_string();
    }

    if let Ok(env_level) = std::env::var("RUST_LOG") {
        if !env_level.trim().is_empty() {
            return env_level;
        }
    }

    logging.level.clone()
}

/// Install the global fmt subscriber with the given filter directive
pub fn init_tracing(filter: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(filter)
        .map_err(|e| Error::Config(format!("Invalid log filter '{}': {}", filter, e)))?;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| Error::Config(format!("Logging already initialized: {}", e)))
}
