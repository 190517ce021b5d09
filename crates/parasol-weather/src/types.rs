use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Condition categories used for iconography (OpenWeather condition groups)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherCondition {
    Clouds,
    Clear,
    Atmosphere,
    Snow,
    Rain,
    Drizzle,
    Thunderstorm,
}

impl WeatherCondition {
    /// Convert an OpenWeather condition id to its group
    /// See: https://openweathermap.org/weather-conditions
    pub fn from_owm_id(id: i32) -> Option<Self> {
        match id {
            200..=299 => Some(Self::Thunderstorm),
            300..=399 => Some(Self::Drizzle),
            500..=599 => Some(Self::Rain),
            600..=699 => Some(Self::Snow),
            700..=799 => Some(Self::Atmosphere),
            800 => Some(Self::Clear),
            801..=899 => Some(Self::Clouds),
            _ => None,
        }
    }

    /// Convert OpenWeather's `main` field. The 7xx group reports the specific
    /// phenomenon (Mist, Haze, ...) rather than "Atmosphere".
    pub fn from_main(main: &str) -> Option<Self> {
        match main {
            "Clouds" => Some(Self::Clouds),
            "Clear" => Some(Self::Clear),
            "Snow" => Some(Self::Snow),
            "Rain" => Some(Self::Rain),
            "Drizzle" => Some(Self::Drizzle),
            "Thunderstorm" => Some(Self::Thunderstorm),
            "Atmosphere" | "Mist" | "Smoke" | "Haze" | "Dust" | "Fog" | "Sand" | "Ash"
            | "Squall" | "Tornado" => Some(Self::Atmosphere),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Clouds => "Clouds",
            Self::Clear => "Clear",
            Self::Atmosphere => "Atmosphere",
            Self::Snow => "Snow",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Thunderstorm => "Thunderstorm",
        }
    }

    /// Fontisto icon name
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Clouds => "cloudy",
            Self::Clear => "day-sunny",
            Self::Atmosphere => "cloudy-gusts",
            Self::Snow => "snow",
            Self::Rain => "rains",
            Self::Drizzle => "rain",
            Self::Thunderstorm => "lightning",
        }
    }
}

/// Geographic location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
    pub city_name: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters: None,
            city_name: None,
        }
    }

    /// Coordinates formatted for display when no place name is known
    pub fn coordinate_label(&self) -> String {
        format!("{:.2}, {:.2}", self.latitude, self.longitude)
    }
}

/// Current conditions as reported by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Degrees Celsius
    pub temperature: f64,
    pub condition: WeatherCondition,
    /// Provider's short label, e.g. "Mist"
    pub summary: String,
    /// Provider's free text, e.g. "light intensity drizzle"
    pub description: String,
}

/// One complete weather reading for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    /// Degrees Celsius
    pub temperature: f64,
    pub condition: WeatherCondition,
    pub summary: String,
    pub description: String,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherSnapshot {
    pub fn new(city: String, current: CurrentConditions) -> Self {
        Self {
            city,
            temperature: current.temperature,
            condition: current.condition,
            summary: current.summary,
            description: current.description,
            fetched_at: Utc::now(),
        }
    }

    /// Temperature with one decimal, as shown on screen
    pub fn temperature_label(&self) -> String {
        format!("{:.1}", self.temperature)
    }
}

/// What the weather panel should show
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WeatherState {
    #[default]
    Loading,
    /// Location permission was refused; weather is never fetched this session
    PermissionDenied,
    Ready(WeatherSnapshot),
    /// The pipeline failed before any snapshot was obtained
    Unavailable(String),
}

impl WeatherState {
    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            Self::Ready(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn permission_granted(&self) -> bool {
        !matches!(self, Self::PermissionDenied)
    }
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Location permission not granted")]
    PermissionDenied,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Location error: {0}")]
    Location(#[from] LocationError),
    #[error("No weather API key configured")]
    MissingApiKey,
    #[error("Weather API rejected the API key")]
    InvalidApiKey,
    #[error("Weather service unavailable (HTTP {0})")]
    ServiceUnavailable(u16),
    #[error("Weather API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
}

impl WeatherError {
    /// Short text for the weather panel
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "Location permission not granted",
            Self::Network(_) => "Weather unavailable. Check your connection.",
            Self::Location(_) => "Could not determine your location",
            Self::MissingApiKey | Self::InvalidApiKey => "Weather API key missing or invalid",
            Self::ServiceUnavailable(_) => "Weather service unavailable. Try again later.",
            Self::Api { .. } | Self::Parse(_) => "Weather data could not be read",
        }
    }
}
