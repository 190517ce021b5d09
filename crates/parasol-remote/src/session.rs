//! One remote-control session: device signals, weather, startup and shutdown.
//!
//! Startup runs two independent paths on the dispatcher's runtime:
//! weather then a short probe (which ends the splash), and a probe with the
//! command deadline. Both write the same connectivity signal; whichever
//! settles last wins.

use std::sync::Arc;
use std::time::Duration;

use parasol_core::{AppError, Config};
use parasol_device::{Command, DeviceDispatcher, PowerState, ReachabilityProber, ToggleReconciler};
use parasol_weather::{
    FixedLocator, Locator, NominatimGeocoder, WeatherError, WeatherFetcher, WeatherProvider,
};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::error_mapping::IntoAppError;
use crate::view::{RemoteView, ViewWatcher};

pub struct RemoteSession<L> {
    dispatcher: DeviceDispatcher,
    toggle: ToggleReconciler,
    prober: ReachabilityProber,
    weather: Arc<WeatherFetcher<L>>,
    probe_deadline: Duration,
    ready: Arc<watch::Sender<bool>>,
    shutdown: CancellationToken,
}

impl RemoteSession<FixedLocator> {
    /// Build a session from the loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let dispatcher = DeviceDispatcher::new(
            &config.device.base_url,
            Duration::from_millis(config.device.command_timeout_ms),
        )
        .map_err(IntoAppError::into_app_error)?;

        let location = &config.location;
        let locator = FixedLocator::new(
            location.enabled,
            location.latitude.zip(location.longitude),
            location.city.clone(),
        );

        let provider =
            WeatherProvider::with_endpoint(&config.weather.endpoint, &config.weather.api_key)
                .map_err(IntoAppError::into_app_error)?;
        let geocoder = NominatimGeocoder::with_base_url(&config.weather.geocode_endpoint)
            .map_err(|e| WeatherError::from(e).into_app_error())?;

        let weather = WeatherFetcher::new(locator, provider).with_geocoder(geocoder);

        Ok(Self::new(
            dispatcher,
            weather,
            Duration::from_millis(config.device.probe_timeout_ms),
        ))
    }
}

impl<L: Locator> RemoteSession<L> {
    pub fn new(
        dispatcher: DeviceDispatcher,
        weather: WeatherFetcher<L>,
        probe_deadline: Duration,
    ) -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            toggle: ToggleReconciler::new(dispatcher.clone()),
            prober: ReachabilityProber::new(dispatcher.clone()),
            dispatcher,
            weather: Arc::new(weather),
            probe_deadline,
            ready: Arc::new(ready),
            shutdown: CancellationToken::new(),
        }
    }

    /// Kick off the startup paths. Returns immediately.
    pub fn start(&self) {
        tracing::info!("Starting remote session");

        let weather = Arc::clone(&self.weather);
        let prober = self.prober.clone();
        let ready = Arc::clone(&self.ready);
        let deadline = self.probe_deadline;
        let token = self.shutdown.clone();
        self.dispatcher.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::debug!("Startup cancelled before weather and probe finished");
                }
                _ = async {
                    // Weather failures are already published on the weather signal
                    let _ = weather.run().await;
                    prober.probe_with_deadline(deadline).await;
                } => {}
            }
            // The splash never outlives startup, whatever happened above
            ready.send_replace(true);
        });

        let prober = self.prober.clone();
        let token = self.shutdown.clone();
        self.dispatcher.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = prober.probe() => {}
            }
        });
    }

    /// Resolves once the startup path has ended.
    pub async fn wait_ready(&self) {
        let mut rx = self.ready.subscribe();
        // Err only if the sender is gone, which cannot outlive `self`
        let _ = rx.wait_for(|ready| *ready).await;
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    /// Handle a button press.
    ///
    /// Motion commands are fire-and-forget. On and Off go through the toggle
    /// so the power signal only moves on the device's confirmation.
    pub fn press(&self, command: Command) {
        match command {
            Command::On => self.toggle.request_on(),
            Command::Off => self.toggle.request_off(),
            Command::Root => self.prober.spawn_probe(None),
            motion => self.dispatcher.dispatch(motion),
        }
    }

    pub fn toggle(&self) {
        self.toggle.toggle();
    }

    pub fn set_power(&self, target: PowerState) {
        self.toggle.request(target);
    }

    /// Send `command` and wait for the reply body, with the command deadline.
    pub async fn command(&self, command: Command) -> Result<String, AppError> {
        self.dispatcher
            .execute(command, self.dispatcher.deadline())
            .await
            .into_result()
            .map_err(IntoAppError::into_app_error)
    }

    /// Re-run the weather pipeline in the background.
    pub fn refresh_weather(&self) {
        let weather = Arc::clone(&self.weather);
        let token = self.shutdown.clone();
        self.dispatcher.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = weather.run() => {}
            }
        });
    }

    pub fn view(&self) -> RemoteView {
        RemoteView {
            ready: self.is_ready(),
            power: self.toggle.state(),
            connectivity: self.prober.connectivity(),
            weather: self.weather.state(),
        }
    }

    pub fn watch(&self) -> ViewWatcher {
        ViewWatcher {
            ready: self.ready.subscribe(),
            power: self.toggle.subscribe(),
            connectivity: self.prober.subscribe(),
            weather: self.weather.subscribe(),
        }
    }

    pub fn dispatcher(&self) -> &DeviceDispatcher {
        &self.dispatcher
    }

    /// Cancel startup work and wait for outstanding commands to settle.
    ///
    /// Dispatched commands are not cancelled; each ends by its own deadline.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down remote session");
        self.shutdown.cancel();
        self.dispatcher.wait_idle().await;
        tracing::info!("Remote session stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_config_defaults() {
        let config = Config::default();
        let session = RemoteSession::from_config(&config).unwrap();
        let view = session.view();
        assert!(!view.ready);
        assert_eq!(view.power, PowerState::Off);
        assert!(view.weather.is_loading());
    }

    #[tokio::test]
    async fn test_from_config_rejects_bad_device_url() {
        let mut config = Config::default();
        config.device.base_url = "not a url".into();
        let err = RemoteSession::from_config(&config).err().unwrap();
        assert!(matches!(
            err,
            AppError::Config(parasol_core::ConfigError::Invalid(_))
        ));
    }
}
