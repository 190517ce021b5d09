//! Centralized error types for Parasol.
//!
//! Service crates keep their own error enums; the session layer maps them into
//! this hierarchy so the presentation layer gets one type with UI-ready text.

use thiserror::Error;

/// Anything the remote can report to the user. `user_message()` gives the
/// text for the status line; `Display` is for logs.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Weather: {0}")]
    Weather(#[from] WeatherError),

    #[error("Config: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Device(e) => e.user_message(),
            AppError::Weather(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "Could not read or write a local file.",
            AppError::Other(_) => "Something went wrong. See the log for details.",
        }
    }
}

/// Errors on the local device channel.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Device did not answer in time")]
    Timeout,

    #[error("Device unreachable: {0}")]
    Unreachable(String),

    #[error("Device returned HTTP {0}")]
    Rejected(u16),

    #[error("Device replied {actual:?}, expected {expected:?}")]
    NotConfirmed { expected: String, actual: String },
}

impl DeviceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DeviceError::Timeout => "The umbrella did not respond. Is it switched on?",
            DeviceError::Unreachable(_) => {
                "Cannot reach the umbrella. Join its Wi-Fi network and try again."
            }
            DeviceError::Rejected(_) => "The umbrella rejected the command.",
            DeviceError::NotConfirmed { .. } => "The umbrella did not confirm the change.",
        }
    }
}

/// Weather path errors.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Location permission not granted")]
    PermissionDenied,

    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Weather API: {0}")]
    ApiError(String),

    #[error("API key rejected")]
    InvalidApiKey,

    #[error("Weather service is down or rate limited")]
    ServiceUnavailable,
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::PermissionDenied => "Location permission not granted.",
            WeatherError::LocationUnavailable(_) => "Could not determine your location.",
            WeatherError::ApiError(_) => "Weather data could not be loaded.",
            WeatherError::InvalidApiKey => "The weather API key was rejected.",
            WeatherError::ServiceUnavailable => "Weather service unavailable. Try again later.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value: {0}")]
    Invalid(String),

    #[error("Could not parse config: {0}")]
    ParseError(String),

    #[error("Setting {0} is required")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "A setting in config.toml is invalid.",
            ConfigError::ParseError(_) => "config.toml could not be parsed.",
            ConfigError::MissingSetting(_) => "A required setting is missing from config.toml.",
        }
    }
}
