//! Reachability prober.
//!
//! A GET to the device root that confirms connectivity when the device greets
//! with `"welcome"`. Failures leave the signal where it was; there is no
//! "unreachable" state, so an absent confirmation looks the same as a failed one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::command::Command;
use crate::dispatcher::DeviceDispatcher;
use crate::executor::RequestOutcome;

/// Body the device returns on its root path.
pub const GREETING: &str = "welcome";

/// UI-facing connectivity signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    #[default]
    Unknown,
    Confirmed,
}

impl Connectivity {
    pub fn is_confirmed(self) -> bool {
        self == Self::Confirmed
    }
}

#[derive(Debug, Clone)]
pub struct ReachabilityProber {
    dispatcher: DeviceDispatcher,
    signal: Arc<watch::Sender<Connectivity>>,
}

impl ReachabilityProber {
    pub fn new(dispatcher: DeviceDispatcher) -> Self {
        let (signal, _) = watch::channel(Connectivity::default());
        Self {
            dispatcher,
            signal: Arc::new(signal),
        }
    }

    pub fn connectivity(&self) -> Connectivity {
        *self.signal.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.signal.subscribe()
    }

    /// Probe with the dispatcher's default deadline.
    pub async fn probe(&self) -> RequestOutcome {
        self.probe_with_deadline(self.dispatcher.deadline()).await
    }

    /// Probe the device root and apply the result to the signal.
    ///
    /// The response status is not inspected; only the body matters.
    pub async fn probe_with_deadline(&self, deadline: Duration) -> RequestOutcome {
        let outcome = self.dispatcher.execute(Command::Root, deadline).await;

        match &outcome {
            RequestOutcome::Timeout => {
                tracing::warn!("Device probe timed out after {:?}", deadline);
            }
            RequestOutcome::NetworkError(cause) => {
                tracing::warn!("Device probe failed: {}", cause);
            }
            RequestOutcome::Success(body) | RequestOutcome::HttpError { body, .. } => {
                if body == GREETING {
                    if !self.signal.send_replace(Connectivity::Confirmed).is_confirmed() {
                        tracing::info!("Device connection confirmed");
                    }
                } else {
                    tracing::debug!("Device probe answered {:?}, not a greeting", body);
                }
            }
        }

        outcome
    }

    /// Fire-and-forget probe tracked by the dispatcher.
    pub fn spawn_probe(&self, deadline: Option<Duration>) {
        let this = self.clone();
        let deadline = deadline.unwrap_or_else(|| self.dispatcher.deadline());
        self.dispatcher.spawn(async move {
            this.probe_with_deadline(deadline).await;
        });
    }
}
