//! End-to-end session tests against mock device and weather servers.

use std::time::Duration;

use parasol_core::{AppError, Config, DeviceError};
use parasol_device::{Command, Connectivity, PowerState};
use parasol_remote::RemoteSession;
use parasol_weather::{FixedLocator, WeatherState};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(device: &str, weather: &MockServer) -> Config {
    let mut config = Config::default();
    config.device.base_url = device.to_string();
    config.weather.endpoint = format!("{}/data/2.5/onecall", weather.uri());
    config.weather.geocode_endpoint = format!("{}/reverse", weather.uri());
    config.weather.api_key = "test-key".to_string();
    config.location.enabled = true;
    config.location.latitude = Some(37.57);
    config.location.longitude = Some(126.98);
    config.location.city = Some("Seoul".to_string());
    config
}

async fn mount_weather(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/onecall"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current": {
                "temp": 21.4,
                "weather": [{ "id": 800, "main": "Clear", "description": "clear sky" }]
            }
        })))
        .mount(server)
        .await;
}

fn session(config: &Config) -> RemoteSession<FixedLocator> {
    RemoteSession::from_config(config).unwrap()
}

#[tokio::test]
async fn test_startup_probes_twice_and_shows_weather() {
    let device = MockServer::start().await;
    let weather = MockServer::start().await;
    mount_weather(&weather).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
        .expect(2)
        .mount(&device)
        .await;

    let session = session(&config_for(&device.uri(), &weather));
    session.start();
    session.wait_ready().await;
    session.dispatcher().wait_idle().await;

    let view = session.view();
    assert!(view.ready);
    assert_eq!(view.connectivity, Connectivity::Confirmed);
    assert_eq!(view.background_color(), "blue");
    let snapshot = view.weather.snapshot().unwrap();
    assert_eq!(snapshot.city, "Seoul");
    assert_eq!(snapshot.temperature_label(), "21.4");

    device.verify().await;
}

#[tokio::test]
async fn test_denied_location_skips_weather_but_finishes_startup() {
    let device = MockServer::start().await;
    let weather = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&weather)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
        .mount(&device)
        .await;

    let mut config = config_for(&device.uri(), &weather);
    config.location.enabled = false;

    let session = session(&config);
    session.start();
    session.wait_ready().await;

    let view = session.view();
    assert!(view.ready);
    assert_eq!(view.weather, WeatherState::PermissionDenied);
    assert_eq!(view.weather_line(), "Location permission not granted");

    session.shutdown().await;
    weather.verify().await;
}

#[tokio::test]
async fn test_slow_device_is_confirmed_by_the_long_probe() {
    let device = MockServer::start().await;
    let weather = MockServer::start().await;
    mount_weather(&weather).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("welcome")
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&device)
        .await;

    let session = session(&config_for(&device.uri(), &weather));
    session.start();

    // The short probe times out; the splash ends anyway
    session.wait_ready().await;
    assert_eq!(session.view().connectivity, Connectivity::Unknown);

    session.dispatcher().wait_idle().await;
    assert_eq!(session.view().connectivity, Connectivity::Confirmed);
}

#[tokio::test]
async fn test_buttons_reach_the_device() {
    let device = MockServer::start().await;
    let weather = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/On"))
        .respond_with(ResponseTemplate::new(200).set_body_string("up"))
        .expect(1)
        .mount(&device)
        .await;
    Mock::given(method("GET"))
        .and(path("/Off"))
        .respond_with(ResponseTemplate::new(200).set_body_string("down"))
        .expect(1)
        .mount(&device)
        .await;
    Mock::given(method("GET"))
        .and(path("/forward"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&device)
        .await;

    let session = session(&config_for(&device.uri(), &weather));

    session.toggle();
    session.dispatcher().wait_idle().await;
    assert_eq!(session.view().power, PowerState::On);

    session.press(Command::Forward);
    session.press(Command::Off);
    session.dispatcher().wait_idle().await;
    assert_eq!(session.view().power, PowerState::Off);

    device.verify().await;
}

#[tokio::test]
async fn test_command_reports_unreachable_device() {
    let weather = MockServer::start().await;
    let session = session(&config_for("http://127.0.0.1:9", &weather));

    let err = session.command(Command::Stop).await.unwrap_err();
    assert!(matches!(err, AppError::Device(DeviceError::Unreachable(_))));
    assert_eq!(
        err.user_message(),
        "Cannot reach the umbrella. Join its Wi-Fi network and try again."
    );
}

#[tokio::test]
async fn test_shutdown_cancels_startup() {
    let device = MockServer::start().await;
    let weather = MockServer::start().await;
    mount_weather(&weather).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("welcome")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&device)
        .await;

    let mut config = config_for(&device.uri(), &weather);
    config.device.probe_timeout_ms = 5000;

    let session = session(&config);
    session.start();
    tokio::time::sleep(Duration::from_millis(100)).await;

    tokio::time::timeout(Duration::from_secs(2), session.shutdown())
        .await
        .expect("shutdown should not wait for the slow probes");

    assert!(session.is_ready());
    assert_eq!(session.view().connectivity, Connectivity::Unknown);
}

#[tokio::test]
async fn test_watcher_sees_startup_finish() {
    let device = MockServer::start().await;
    let weather = MockServer::start().await;
    mount_weather(&weather).await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("welcome"))
        .mount(&device)
        .await;

    let session = session(&config_for(&device.uri(), &weather));
    let mut watcher = session.watch();
    assert!(!watcher.current().ready);

    session.start();
    let mut view = watcher.changed().await.unwrap();
    while !view.ready {
        view = watcher.changed().await.unwrap();
    }
    assert!(view.ready);
}
