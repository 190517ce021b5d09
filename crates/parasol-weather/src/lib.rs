//! Weather for Parasol
//!
//! Current conditions from OpenWeather, keyed by the device's position, with
//! the city name resolved offline where the location source can and through
//! Nominatim otherwise.

pub mod fetcher;
pub mod geocode;
pub mod location;
pub mod provider;
pub mod types;

pub use fetcher::WeatherFetcher;
pub use geocode::NominatimGeocoder;
pub use location::{FixedLocator, Locator};
pub use provider::WeatherProvider;
pub use types::*;
