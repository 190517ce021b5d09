//! View snapshots for the presentation layer.

use std::fmt;

use parasol_device::{Connectivity, PowerState};
use parasol_weather::WeatherState;
use tokio::sync::watch;

/// Everything the remote's screen renders, read at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteView {
    /// Startup finished (splash can be hidden)
    pub ready: bool,
    pub power: PowerState,
    pub connectivity: Connectivity,
    pub weather: WeatherState,
}

impl RemoteView {
    /// Screen background; blue once the device has greeted us.
    pub fn background_color(&self) -> &'static str {
        match self.connectivity {
            Connectivity::Confirmed => "blue",
            Connectivity::Unknown => "slategray",
        }
    }

    /// Weather panel text. Never a spinner after a refused permission.
    pub fn weather_line(&self) -> String {
        match &self.weather {
            WeatherState::Loading => "Loading...".to_string(),
            WeatherState::PermissionDenied => "Location permission not granted".to_string(),
            WeatherState::Ready(s) => format!(
                "{}: {}°C {} ({})",
                s.city,
                s.temperature_label(),
                s.summary,
                s.description
            ),
            WeatherState::Unavailable(message) => message.clone(),
        }
    }
}

impl fmt::Display for RemoteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Weather:    {}", self.weather_line())?;
        writeln!(
            f,
            "Device:     {}",
            match self.connectivity {
                Connectivity::Confirmed => "connected",
                Connectivity::Unknown => "not confirmed",
            }
        )?;
        write!(
            f,
            "Gyro mode:  {}",
            if self.power.is_on() { "on" } else { "off" }
        )
    }
}

/// Waits for any signal behind a `RemoteView` to change.
#[derive(Debug)]
pub struct ViewWatcher {
    pub(crate) ready: watch::Receiver<bool>,
    pub(crate) power: watch::Receiver<PowerState>,
    pub(crate) connectivity: watch::Receiver<Connectivity>,
    pub(crate) weather: watch::Receiver<WeatherState>,
}

impl ViewWatcher {
    /// Current values, marking them as seen.
    pub fn current(&mut self) -> RemoteView {
        RemoteView {
            ready: *self.ready.borrow_and_update(),
            power: *self.power.borrow_and_update(),
            connectivity: *self.connectivity.borrow_and_update(),
            weather: self.weather.borrow_and_update().clone(),
        }
    }

    /// Resolve with a fresh view after the next change.
    ///
    /// Returns `None` once the session behind the watcher is gone.
    pub async fn changed(&mut self) -> Option<RemoteView> {
        let result = tokio::select! {
            r = self.ready.changed() => r,
            r = self.power.changed() => r,
            r = self.connectivity.changed() => r,
            r = self.weather.changed() => r,
        };
        result.ok()?;
        Some(self.current())
    }
}
