use parasol_core::{AppError, ConfigError, WeatherError as CoreWeatherError};
use parasol_weather::WeatherError;

use super::IntoAppError;

impl IntoAppError for WeatherError {
    fn into_app_error(self) -> AppError {
        let err = match self {
            WeatherError::PermissionDenied => CoreWeatherError::PermissionDenied,
            WeatherError::Location(e) => CoreWeatherError::LocationUnavailable(e.to_string()),
            WeatherError::MissingApiKey => {
                return AppError::Config(ConfigError::MissingSetting("weather.api_key".into()))
            }
            WeatherError::InvalidApiKey => CoreWeatherError::InvalidApiKey,
            WeatherError::ServiceUnavailable(_) => CoreWeatherError::ServiceUnavailable,
            e @ (WeatherError::Network(_) | WeatherError::Api { .. } | WeatherError::Parse(_)) => {
                CoreWeatherError::ApiError(e.to_string())
            }
        };
        AppError::Weather(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parasol_weather::LocationError;

    #[test]
    fn test_permission_denied() {
        let err = WeatherError::PermissionDenied.into_app_error();
        assert_eq!(err.user_message(), "Location permission not granted.");
    }

    #[test]
    fn test_missing_key_is_config() {
        assert!(matches!(
            WeatherError::MissingApiKey.into_app_error(),
            AppError::Config(ConfigError::MissingSetting(ref s)) if s == "weather.api_key"
        ));
    }

    #[test]
    fn test_location_and_service_errors() {
        assert!(matches!(
            WeatherError::Location(LocationError::Timeout).into_app_error(),
            AppError::Weather(CoreWeatherError::LocationUnavailable(_))
        ));
        assert!(matches!(
            WeatherError::ServiceUnavailable(503).into_app_error(),
            AppError::Weather(CoreWeatherError::ServiceUnavailable)
        ));
        assert!(matches!(
            WeatherError::Parse("bad".into()).into_app_error(),
            AppError::Weather(CoreWeatherError::ApiError(_))
        ));
    }
}
