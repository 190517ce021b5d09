//! Integration tests for DeviceDispatcher using wiremock.

use std::time::Duration;

use parasol_device::{Command, DeviceDispatcher, RequestOutcome};
use tokio::sync::mpsc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn dispatcher_for(server: &MockServer, deadline_ms: u64) -> DeviceDispatcher {
    DeviceDispatcher::new(&server.uri(), Duration::from_millis(deadline_ms)).unwrap()
}

/// Port with nothing listening on it
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

#[tokio::test]
async fn test_every_command_issues_one_get_to_its_path() {
    let mock_server = MockServer::start().await;

    for command in Command::ALL {
        Mock::given(method("GET"))
            .and(path(command.path()))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let dispatcher = dispatcher_for(&mock_server, 2000);
    for command in Command::ALL {
        dispatcher.dispatch(command);
    }
    dispatcher.wait_idle().await;

    mock_server.verify().await;
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), Command::ALL.len());
    assert!(requests.iter().all(|r| r.method.as_str() == "GET"));
    assert!(requests.iter().all(|r| r.body.is_empty()));
}

#[tokio::test]
async fn test_dispatch_with_delivers_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forward"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moving"))
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server, 2000);
    let (tx, mut rx) = mpsc::unbounded_channel();
    dispatcher.dispatch_with(Command::Forward, move |body| {
        let _ = tx.send(body);
    });
    dispatcher.wait_idle().await;

    assert_eq!(rx.recv().await.as_deref(), Some("moving"));
}

#[tokio::test]
async fn test_dispatch_with_skips_continuation_on_http_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/On"))
        .respond_with(ResponseTemplate::new(500).set_body_string("up"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server, 2000);
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    dispatcher.dispatch_with(Command::On, move |body| {
        let _ = tx.send(body);
    });
    dispatcher.wait_idle().await;

    // Sender was dropped without sending
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn test_dispatch_with_skips_continuation_on_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stop"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("stopped")
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server, 100);
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    dispatcher.dispatch_with(Command::Stop, move |body| {
        let _ = tx.send(body);
    });
    dispatcher.wait_idle().await;

    // Let the late response arrive; nobody is listening for it anymore
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn test_dispatch_with_skips_continuation_when_unreachable() {
    let dispatcher = DeviceDispatcher::new(&closed_port_url(), Duration::from_secs(2)).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    dispatcher.dispatch_with(Command::Backward, move |body| {
        let _ = tx.send(body);
    });
    dispatcher.wait_idle().await;

    assert_eq!(rx.recv().await, None);
}

#[tokio::test]
async fn test_stop_twice_is_two_independent_requests() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/stop"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server, 2000);
    assert_eq!(dispatcher.send(Command::Stop).await.as_deref(), Some(""));
    assert_eq!(dispatcher.send(Command::Stop).await.as_deref(), Some(""));
    assert_eq!(dispatcher.in_flight(), 0);
}

#[tokio::test]
async fn test_send_swallows_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/max"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server, 2000);
    assert_eq!(dispatcher.send(Command::Max).await, None);
}

#[tokio::test]
async fn test_execute_reports_raw_outcomes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/medium"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/speedup"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(400)))
        .mount(&mock_server)
        .await;

    let dispatcher = dispatcher_for(&mock_server, 2000);

    let outcome = dispatcher
        .execute(Command::Medium, Duration::from_secs(1))
        .await;
    assert_eq!(
        outcome,
        RequestOutcome::HttpError {
            status: 503,
            body: "busy".to_string()
        }
    );

    let outcome = dispatcher
        .execute(Command::SpeedUp, Duration::from_millis(50))
        .await;
    assert_eq!(outcome, RequestOutcome::Timeout);
}
