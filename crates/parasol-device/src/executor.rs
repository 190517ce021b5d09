//! Timed request executor: one outbound GET raced against a deadline.
//!
//! When the deadline wins, the in-flight request future is dropped. That is
//! abandonment at the task level; the transport may or may not notice, but a
//! late answer can no longer reach any caller.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::instrument;
use url::Url;

use crate::error::DeviceError;

/// Deadline used when a caller does not name one.
pub const DEFAULT_DEADLINE: Duration = Duration::from_millis(8000);

/// Deadline for the bootstrap reachability probe.
pub const PROBE_DEADLINE: Duration = Duration::from_millis(1000);

const USER_AGENT: &str = concat!("parasol/", env!("CARGO_PKG_VERSION"));

/// Result of a single timed request. Exactly one variant, never partial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// 2xx response with its body
    Success(String),
    /// Deadline elapsed before the response (headers and body) arrived
    Timeout,
    /// DNS, connect, reset, or body read failure
    NetworkError(String),
    /// Non-2xx response; the body is kept for callers that ignore status
    HttpError { status: u16, body: String },
}

impl RequestOutcome {
    /// Body of any response the device produced, regardless of status.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Success(body) | Self::HttpError { body, .. } => Some(body),
            Self::Timeout | Self::NetworkError(_) => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Collapse into a `Result`, treating non-2xx as a failure.
    pub fn into_result(self) -> Result<String, DeviceError> {
        match self {
            Self::Success(body) => Ok(body),
            Self::Timeout => Err(DeviceError::Timeout),
            Self::NetworkError(cause) => Err(DeviceError::Network(cause)),
            Self::HttpError { status, .. } => Err(DeviceError::Http { status }),
        }
    }
}

/// Issues GET requests under a deadline. No retries at this layer.
#[derive(Debug, Clone)]
pub struct TimedExecutor {
    client: Client,
}

impl TimedExecutor {
    pub fn new() -> Result<Self, DeviceError> {
        // No client-level timeout: the deadline race below is the only bound.
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    /// Run a GET against `url`, settling on whichever finishes first: the
    /// response or the deadline.
    #[instrument(skip(self, url), fields(url = %url), level = "debug")]
    pub async fn execute(&self, url: &Url, deadline: Duration) -> RequestOutcome {
        match tokio::time::timeout(deadline, self.fetch(url)).await {
            Err(_) => {
                tracing::debug!("Deadline of {:?} elapsed", deadline);
                RequestOutcome::Timeout
            }
            Ok(Err(e)) if e.is_timeout() => RequestOutcome::Timeout,
            Ok(Err(e)) => RequestOutcome::NetworkError(e.to_string()),
            Ok(Ok((status, body))) if status.is_success() => RequestOutcome::Success(body),
            Ok(Ok((status, body))) => RequestOutcome::HttpError {
                status: status.as_u16(),
                body,
            },
        }
    }

    async fn fetch(&self, url: &Url) -> Result<(StatusCode, String), reqwest::Error> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }
}
