//! Device command dispatcher.
//!
//! Commands are best-effort: a failure is logged and dropped, and the caller's
//! continuation only ever sees a body from a 2xx response.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio_util::task::TaskTracker;
use url::Url;

use crate::command::Command;
use crate::error::DeviceError;
use crate::executor::{RequestOutcome, TimedExecutor};

/// Sends commands to the device at a fixed base address.
///
/// Cheap to clone; clones share the HTTP client and the set of in-flight tasks.
#[derive(Debug, Clone)]
pub struct DeviceDispatcher {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    executor: TimedExecutor,
    base_url: Url,
    deadline: Duration,
    runtime: Handle,
    tasks: TaskTracker,
    // Held across close/wait/reopen in wait_idle
    draining: Mutex<()>,
}

impl DeviceDispatcher {
    /// Create a dispatcher bound to the current tokio runtime.
    pub fn new(base_url: &str, deadline: Duration) -> Result<Self, DeviceError> {
        let runtime = Handle::try_current().map_err(|_| DeviceError::NoRuntime)?;
        Self::with_runtime(base_url, deadline, runtime)
    }

    /// Create a dispatcher that spawns its fire-and-forget work on `runtime`,
    /// so it can be driven from a thread outside the runtime.
    pub fn with_runtime(
        base_url: &str,
        deadline: Duration,
        runtime: Handle,
    ) -> Result<Self, DeviceError> {
        let base_url = Url::parse(base_url).map_err(|source| DeviceError::InvalidBaseUrl {
            address: base_url.to_string(),
            source,
        })?;

        Ok(Self {
            inner: Arc::new(Inner {
                executor: TimedExecutor::new()?,
                base_url,
                deadline,
                runtime,
                tasks: TaskTracker::new(),
                draining: Mutex::new(()),
            }),
        })
    }

    /// Default deadline for commands sent through this dispatcher.
    pub fn deadline(&self) -> Duration {
        self.inner.deadline
    }

    /// Full URL for a command: base address followed by the command path.
    pub fn endpoint(&self, command: Command) -> Url {
        let mut url = self.inner.base_url.clone();
        let base_path = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}{}", base_path, command.path()));
        url
    }

    /// Raw timed GET for `command`. Nothing is logged or interpreted.
    pub async fn execute(&self, command: Command, deadline: Duration) -> RequestOutcome {
        self.inner
            .executor
            .execute(&self.endpoint(command), deadline)
            .await
    }

    /// Send `command` and return the body of a 2xx reply.
    ///
    /// Timeouts, transport errors and non-2xx statuses are logged and
    /// reported as `None`.
    pub async fn send(&self, command: Command) -> Option<String> {
        match self.execute(command, self.inner.deadline).await {
            RequestOutcome::Success(body) => {
                tracing::debug!("{} -> {:?}", command, body);
                Some(body)
            }
            RequestOutcome::Timeout => {
                tracing::warn!(
                    "Device did not answer {} within {:?}",
                    command,
                    self.inner.deadline
                );
                None
            }
            RequestOutcome::NetworkError(cause) => {
                tracing::warn!("Device request {} failed: {}", command, cause);
                None
            }
            RequestOutcome::HttpError { status, .. } => {
                tracing::warn!("Device rejected {} with HTTP {}", command, status);
                None
            }
        }
    }

    /// Fire-and-forget `command`; the reply is ignored.
    pub fn dispatch(&self, command: Command) {
        let this = self.clone();
        self.spawn(async move {
            this.send(command).await;
        });
    }

    /// Fire-and-forget `command`, handing a 2xx body to `on_body`.
    ///
    /// `on_body` never runs for a failed or timed-out request.
    pub fn dispatch_with<F>(&self, command: Command, on_body: F)
    where
        F: FnOnce(String) + Send + 'static,
    {
        let this = self.clone();
        self.spawn(async move {
            if let Some(body) = this.send(command).await {
                on_body(body);
            }
        });
    }

    /// Spawn tracked work on the dispatcher's runtime.
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inner.tasks.spawn_on(task, &self.inner.runtime);
    }

    /// Number of dispatched tasks still in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.tasks.len()
    }

    /// Wait until every dispatched task has settled.
    ///
    /// Concurrent callers are serialized, so one caller's reopen cannot land
    /// between another's close and wait.
    pub async fn wait_idle(&self) {
        let _draining = self.inner.draining.lock().await;
        self.inner.tasks.close();
        self.inner.tasks.wait().await;
        self.inner.tasks.reopen();
    }
}
