use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable that overrides `weather.api_key`
pub const API_KEY_ENV: &str = "PARASOL_OPENWEATHER_KEY";

/// One problem found by [`Config::validate`].
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Everything [`Config::validate`] found.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Warnings do not count.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// All errors on one line, `;`-separated.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    #[serde(skip)]
    pub config_dir: PathBuf,

    /// Umbrella appliance on the local network
    #[serde(default)]
    pub device: DeviceConfig,

    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Position source standing in for the platform location service
    #[serde(default)]
    pub location: LocationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Fixed base address of the device (no trailing slash needed)
    #[serde(default = "default_device_url")]
    pub base_url: String,

    /// Deadline for the bootstrap reachability probe
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_ms: u64,

    /// Deadline for commands and the second startup probe
    #[serde(default = "default_command_timeout")]
    pub command_timeout_ms: u64,
}

fn default_device_url() -> String {
    "http://192.168.4.1".to_string()
}

fn default_probe_timeout() -> u64 {
    1000
}

fn default_command_timeout() -> u64 {
    8000
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_url: default_device_url(),
            probe_timeout_ms: default_probe_timeout(),
            command_timeout_ms: default_command_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Current-conditions endpoint (OpenWeather One Call)
    #[serde(default = "default_weather_endpoint")]
    pub endpoint: String,

    /// OpenWeather API key. `PARASOL_OPENWEATHER_KEY` takes precedence.
    #[serde(default)]
    pub api_key: String,

    /// Network reverse geocoder used when the location source has no city
    #[serde(default = "default_geocode_endpoint")]
    pub geocode_endpoint: String,
}

fn default_weather_endpoint() -> String {
    "https://api.openweathermap.org/data/2.5/onecall".to_string()
}

fn default_geocode_endpoint() -> String {
    "https://nominatim.openstreetmap.org/reverse".to_string()
}

impl WeatherConfig {
    /// Check if an API key is present (not a placeholder)
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_key.starts_with("YOUR_")
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: default_weather_endpoint(),
            api_key: String::new(),
            geocode_endpoint: default_geocode_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Whether location access is granted
    #[serde(default)]
    pub enabled: bool,

    pub latitude: Option<f64>,

    pub longitude: Option<f64>,

    /// Locality name resolved without a network lookup
    pub city: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("parasol");

        Self {
            config_dir,
            device: DeviceConfig::default(),
            weather: WeatherConfig::default(),
            location: LocationConfig::default(),
        }
    }
}

impl Config {
    /// Read `config.toml` from the platform config dir.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Read the config at `config_path`. A missing file is written out with
    /// defaults first. `PARASOL_OPENWEATHER_KEY` wins over the file's key.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let config_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut config = if config_path.exists() {
            let contents =
                std::fs::read_to_string(config_path).context("Failed to read config file")?;
            toml::from_str::<Config>(&contents).context("Failed to parse config file")?
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            config
        };
        config.config_dir = config_dir;

        // Applied after any save: an environment key is never written to disk
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                config.weather.api_key = key;
            }
        }

        Ok(config)
    }

    /// [`Config::load`] followed by [`Config::validate`]; errors are fatal,
    /// warnings are logged and handed back.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        Self::load_validated_from(&Self::config_path()?)
    }

    /// [`Config::load_validated`] for an explicit path.
    pub fn load_validated_from(config_path: &Path) -> Result<(Self, ValidationResult)> {
        let config = Self::load_from(config_path)?;
        let validation = config.validate();
        if !validation.is_valid() {
            anyhow::bail!("Invalid config: {}", validation.error_summary());
        }
        for warning in &validation.warnings {
            tracing::warn!("config: {}", warning);
        }

        Ok((config, validation))
    }

    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        for (field, value) in [
            ("device.base_url", &self.device.base_url),
            ("weather.endpoint", &self.weather.endpoint),
            ("weather.geocode_endpoint", &self.weather.geocode_endpoint),
        ] {
            check_url(field, value, &mut result);
        }

        if self.device.probe_timeout_ms == 0 {
            result.add_error("device.probe_timeout_ms", "Deadline must be greater than 0");
        }
        if self.device.command_timeout_ms == 0 {
            result.add_error(
                "device.command_timeout_ms",
                "Deadline must be greater than 0",
            );
        }
        if self.device.probe_timeout_ms > self.device.command_timeout_ms {
            result.add_warning(
                "device.probe_timeout_ms",
                "Probe deadline is longer than the command deadline",
            );
        }

        if !self.weather.has_api_key() {
            result.add_warning(
                "weather.api_key",
                format!("No API key configured (set {API_KEY_ENV}) - weather will be unavailable"),
            );
        }

        if self.location.enabled {
            match (self.location.latitude, self.location.longitude) {
                (Some(lat), Some(lon)) => {
                    if !(-90.0..=90.0).contains(&lat) {
                        result.add_error("location.latitude", "Latitude must be within -90..90");
                    }
                    if !(-180.0..=180.0).contains(&lon) {
                        result.add_error(
                            "location.longitude",
                            "Longitude must be within -180..180",
                        );
                    }
                }
                _ => result.add_error(
                    "location",
                    "Location is enabled but latitude/longitude are missing",
                ),
            }
        }

        result
    }

    /// Write to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, contents)
            .with_context(|| format!("Failed to write {}", config_path.display()))
    }

    /// `<platform config dir>/parasol/config.toml`
    pub fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("No platform config directory")?;
        Ok(base.join("parasol").join("config.toml"))
    }
}

/// Addresses must be absolute http(s) URLs with a host.
fn check_url(field: &str, value: &str, result: &mut ValidationResult) {
    let url = match Url::parse(value) {
        Ok(url) => url,
        Err(e) => return result.add_error(field, format!("Not a URL ({e}): {value:?}")),
    };
    if !matches!(url.scheme(), "http" | "https") {
        result.add_error(
            field,
            format!("Expected an http or https URL, got {}", url.scheme()),
        );
    }
    match url.host_str() {
        None | Some("") => result.add_error(field, "URL has no host"),
        Some(_) if url.port() == Some(0) => result.add_error(field, "Port 0 is not usable"),
        Some(_) => {}
    }
}
