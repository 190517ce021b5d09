//! City names for coordinates the locator could not name itself.
//!
//! Backed by the public Nominatim reverse endpoint, which needs a user agent
//! but no key.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::types::Location;

pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("parasol/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<Address>,
}

#[derive(Debug, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
    state_district: Option<String>,
    county: Option<String>,
    state: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_base_url(NOMINATIM_URL)
    }

    pub fn with_base_url(base_url: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(LOOKUP_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Locality for `location`, e.g. "Seoul". A name already on the location
    /// is returned as is. Lookup failures are logged and give `None`.
    pub async fn reverse(&self, location: &Location) -> Option<String> {
        if let Some(city) = &location.city_name {
            return Some(city.clone());
        }

        let response = match self
            .client
            .get(&self.base_url)
            .query(&[
                ("lat", location.latitude.to_string()),
                ("lon", location.longitude.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
                ("zoom", "10".to_string()),
            ])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!("Nominatim lookup failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::debug!("Nominatim answered HTTP {}", response.status());
            return None;
        }

        let body: ReverseResponse = match response.json().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!("Unreadable Nominatim reply: {}", e);
                return None;
            }
        };

        let place = body.address?.locality()?;
        tracing::info!("Located in {}", place);
        Some(place)
    }
}

impl Address {
    /// Most specific settlement name available.
    fn locality(self) -> Option<String> {
        [
            self.city,
            self.town,
            self.village,
            self.municipality,
            self.state_district,
            self.county,
            self.state,
        ]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Run with: cargo test -p parasol-weather -- --ignored
    async fn test_reverse_geocode_seoul() {
        let geocoder = NominatimGeocoder::new().unwrap();
        let name = geocoder.reverse(&Location::new(37.5665, 126.978)).await;
        assert!(name.unwrap().to_lowercase().contains("seoul"));
    }

    #[test]
    fn test_locality_prefers_most_specific() {
        let address = Address {
            city: None,
            town: Some(String::new()),
            village: Some("Hahoe".into()),
            municipality: None,
            state_district: None,
            county: Some("Andong".into()),
            state: Some("Gyeongbuk".into()),
        };
        assert_eq!(address.locality().as_deref(), Some("Hahoe"));
    }

    #[tokio::test]
    async fn test_known_city_skips_lookup() {
        // Unroutable base URL: a lookup would fail, so a result proves no lookup happened
        let geocoder = NominatimGeocoder::with_base_url("http://127.0.0.1:9/reverse").unwrap();
        let loc = Location {
            city_name: Some("Busan".to_string()),
            ..Location::new(35.1796, 129.0756)
        };
        assert_eq!(geocoder.reverse(&loc).await.as_deref(), Some("Busan"));
    }
}
