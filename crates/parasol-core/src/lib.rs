pub mod config;
pub mod error;

pub use config::{
    Config, ConfigValidationError, DeviceConfig, LocationConfig, ValidationResult, WeatherConfig,
};
pub use error::{AppError, ConfigError, DeviceError, WeatherError};

use anyhow::Result;

/// Install the global tracing subscriber. `RUST_LOG` overrides the `info` default.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("Parasol core initialized");
    Ok(())
}
