//! Tracing subscriber setup for the server binary.

use ac_shared::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Returns an error if a
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    match config.format {
        LogFormat::Json => builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e)),
        LogFormat::Pretty => builder
            .pretty()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e)),
    }
}
