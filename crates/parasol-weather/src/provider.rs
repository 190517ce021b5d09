//! OpenWeather current-conditions client.
//!
//! Only the `current` block is requested: minutely, hourly, daily and alerts
//! are excluded to keep the payload small. Units are metric.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::instrument;

use crate::types::{CurrentConditions, Location, WeatherCondition, WeatherError};

pub const ONE_CALL_URL: &str = "https://api.openweathermap.org/data/2.5/onecall";
const EXCLUDE: &str = "alerts,minutely,hourly,daily";
const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    current: ApiCurrent,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    temp: f64,
    #[serde(default)]
    weather: Vec<ApiCondition>,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    id: i32,
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    endpoint: String,
    api_key: String,
}

impl WeatherProvider {
    pub fn new(api_key: &str) -> Result<Self, WeatherError> {
        Self::with_endpoint(ONE_CALL_URL, api_key)
    }

    pub fn with_endpoint(endpoint: &str, api_key: &str) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            endpoint: endpoint.to_string(),
            api_key: api_key.trim().to_string(),
        })
    }

    /// Fetch current conditions at `location`.
    #[instrument(skip(self, location), fields(lat = location.latitude, lon = location.longitude), level = "info")]
    pub async fn current(&self, location: &Location) -> Result<CurrentConditions, WeatherError> {
        if self.api_key.is_empty() {
            return Err(WeatherError::MissingApiKey);
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("lat", location.latitude.to_string()),
                ("lon", location.longitude.to_string()),
                ("exclude", EXCLUDE.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED => WeatherError::InvalidApiKey,
                StatusCode::TOO_MANY_REQUESTS => WeatherError::ServiceUnavailable(status.as_u16()),
                s if s.is_server_error() => WeatherError::ServiceUnavailable(s.as_u16()),
                s => WeatherError::Api {
                    status: s.as_u16(),
                    message,
                },
            });
        }

        let body = response.text().await?;
        parse_current(&body)
    }
}

fn parse_current(body: &str) -> Result<CurrentConditions, WeatherError> {
    let parsed: OneCallResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::Parse(e.to_string()))?;

    let first = parsed
        .current
        .weather
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::Parse("current.weather is empty".to_string()))?;

    let condition = WeatherCondition::from_main(&first.main)
        .or_else(|| WeatherCondition::from_owm_id(first.id))
        .ok_or_else(|| {
            WeatherError::Parse(format!(
                "unrecognised condition {} ({})",
                first.main, first.id
            ))
        })?;

    Ok(CurrentConditions {
        temperature: parsed.current.temp,
        condition,
        summary: first.main,
        description: first.description,
    })
}
