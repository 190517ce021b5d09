//! Weather fetch pipeline: permission, position, city name, current conditions.
//!
//! Each step short-circuits the rest. A refused permission is terminal for the
//! session. Later failures are surfaced as `Unavailable` unless a snapshot is
//! already on screen, in which case that snapshot stays.

use tokio::sync::watch;

use crate::geocode::NominatimGeocoder;
use crate::location::Locator;
use crate::provider::WeatherProvider;
use crate::types::{Location, WeatherError, WeatherSnapshot, WeatherState};

pub struct WeatherFetcher<L> {
    locator: L,
    provider: WeatherProvider,
    geocoder: Option<NominatimGeocoder>,
    state: watch::Sender<WeatherState>,
}

impl<L: Locator> WeatherFetcher<L> {
    pub fn new(locator: L, provider: WeatherProvider) -> Self {
        let (state, _) = watch::channel(WeatherState::default());
        Self {
            locator,
            provider,
            geocoder: None,
            state,
        }
    }

    /// Use a network reverse geocoder when the locator cannot name the city.
    pub fn with_geocoder(mut self, geocoder: NominatimGeocoder) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn state(&self) -> WeatherState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WeatherState> {
        self.state.subscribe()
    }

    /// `false` once the permission request has been refused.
    pub fn permission_granted(&self) -> bool {
        self.state.borrow().permission_granted()
    }

    /// Run the pipeline once and publish the resulting state.
    pub async fn run(&self) -> Result<WeatherSnapshot, WeatherError> {
        let result = self.fetch().await;

        match &result {
            Ok(snapshot) => {
                tracing::info!(
                    "Weather for {}: {} {}",
                    snapshot.city,
                    snapshot.temperature_label(),
                    snapshot.summary
                );
                self.state.send_replace(WeatherState::Ready(snapshot.clone()));
            }
            Err(WeatherError::PermissionDenied) => {
                tracing::info!("Location permission denied; weather disabled");
                self.state.send_replace(WeatherState::PermissionDenied);
            }
            Err(e) => {
                tracing::error!("Weather fetch failed: {}", e);
                let message = e.user_message().to_string();
                self.state.send_if_modified(|state| match state {
                    WeatherState::Ready(_) => false,
                    _ => {
                        *state = WeatherState::Unavailable(message);
                        true
                    }
                });
            }
        }

        result
    }

    async fn fetch(&self) -> Result<WeatherSnapshot, WeatherError> {
        if !self.permission_granted() || !self.locator.request_permission().await {
            return Err(WeatherError::PermissionDenied);
        }

        let location = self.locator.current_position().await?;
        tracing::debug!("Got location: {}, {}", location.latitude, location.longitude);

        let city = self.resolve_city(&location).await;
        let current = self.provider.current(&location).await?;

        Ok(WeatherSnapshot::new(city, current))
    }

    /// Offline locality first, then the network geocoder, then coordinates.
    async fn resolve_city(&self, location: &Location) -> String {
        if let Some(city) = self.locator.locality(location).await {
            return city;
        }
        if let Some(geocoder) = &self.geocoder {
            if let Some(city) = geocoder.reverse(location).await {
                return city;
            }
        }
        location.coordinate_label()
    }
}
