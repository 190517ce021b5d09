//! Location source boundary.
//!
//! On a phone this is the platform location service; on a desktop host the
//! position comes from configuration.

use std::future::Future;

use crate::types::{Location, LocationError};

/// Platform location service as seen by the weather fetcher.
pub trait Locator: Send + Sync + 'static {
    /// Ask for foreground location access. `false` means denied.
    fn request_permission(&self) -> impl Future<Output = bool> + Send;

    fn current_position(&self) -> impl Future<Output = Result<Location, LocationError>> + Send;

    /// Locality name for `location` without a network lookup, when the
    /// platform can provide one.
    fn locality(&self, location: &Location) -> impl Future<Output = Option<String>> + Send;
}

/// Locator with a fixed grant, position and optional city name.
#[derive(Debug, Clone, Default)]
pub struct FixedLocator {
    granted: bool,
    position: Option<(f64, f64)>,
    city: Option<String>,
}

impl FixedLocator {
    pub fn new(granted: bool, position: Option<(f64, f64)>, city: Option<String>) -> Self {
        Self {
            granted,
            position,
            city: city.filter(|c| !c.trim().is_empty()),
        }
    }

    /// A locator whose permission request is always refused.
    pub fn denied() -> Self {
        Self::default()
    }
}

impl Locator for FixedLocator {
    async fn request_permission(&self) -> bool {
        self.granted
    }

    async fn current_position(&self) -> Result<Location, LocationError> {
        if !self.granted {
            return Err(LocationError::PermissionDenied);
        }
        let (latitude, longitude) = self.position.ok_or(LocationError::ServiceUnavailable)?;
        Ok(Location {
            latitude,
            longitude,
            accuracy_meters: None,
            city_name: self.city.clone(),
        })
    }

    async fn locality(&self, location: &Location) -> Option<String> {
        location.city_name.clone().or_else(|| self.city.clone())
    }
}
