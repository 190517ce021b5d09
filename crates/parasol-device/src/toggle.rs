//! Toggle reconciler for the device's power ("gyro mode") switch.
//!
//! The confirmed state only moves when the device echoes the exact token for
//! the requested transition. Nothing is flipped ahead of the reply, so there is
//! nothing to roll back when the device is unreachable.
//!
//! Overlapping requests are not serialized: whichever confirmation settles
//! last wins, regardless of the order the requests were issued in.

use std::sync::Arc;

use tokio::sync::watch;

use crate::command::Command;
use crate::dispatcher::DeviceDispatcher;
use crate::error::DeviceError;

/// Body the device sends after switching on.
pub const ON_CONFIRMATION: &str = "up";

/// Body the device sends after switching off.
pub const OFF_CONFIRMATION: &str = "down";

/// Confirmed power state of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerState {
    #[default]
    Off,
    On,
}

impl PowerState {
    pub fn is_on(self) -> bool {
        self == Self::On
    }

    /// Command that requests this state.
    pub fn command(self) -> Command {
        match self {
            Self::On => Command::On,
            Self::Off => Command::Off,
        }
    }

    /// Token the device must reply with to confirm this state.
    pub fn confirmation(self) -> &'static str {
        match self {
            Self::On => ON_CONFIRMATION,
            Self::Off => OFF_CONFIRMATION,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}

/// Check a reply body against the token for `target`. Exact, case-sensitive.
pub fn confirm(target: PowerState, body: &str) -> Result<(), DeviceError> {
    if body == target.confirmation() {
        Ok(())
    } else {
        Err(DeviceError::ConfirmationMismatch {
            expected: target.confirmation(),
            actual: body.to_string(),
        })
    }
}

/// Two-state switch that follows the device, never the user's intent.
#[derive(Debug, Clone)]
pub struct ToggleReconciler {
    dispatcher: DeviceDispatcher,
    state: Arc<watch::Sender<PowerState>>,
}

impl ToggleReconciler {
    /// Starts in `PowerState::Off`.
    pub fn new(dispatcher: DeviceDispatcher) -> Self {
        let (state, _) = watch::channel(PowerState::default());
        Self {
            dispatcher,
            state: Arc::new(state),
        }
    }

    /// Last confirmed state.
    pub fn state(&self) -> PowerState {
        *self.state.borrow()
    }

    /// Observe confirmed state changes.
    pub fn subscribe(&self) -> watch::Receiver<PowerState> {
        self.state.subscribe()
    }

    /// Ask the device to switch on; state becomes `On` only on an `"up"` reply.
    pub fn request_on(&self) {
        self.request(PowerState::On);
    }

    /// Ask the device to switch off; state becomes `Off` only on a `"down"` reply.
    pub fn request_off(&self) {
        self.request(PowerState::Off);
    }

    /// Request the opposite of the currently confirmed state.
    pub fn toggle(&self) {
        self.request(self.state().flipped());
    }

    /// Dispatch the command for `target` and apply the reply when it settles.
    pub fn request(&self, target: PowerState) {
        let state = Arc::clone(&self.state);
        tracing::debug!("Requesting power {:?}", target);

        self.dispatcher
            .dispatch_with(target.command(), move |body| match confirm(target, &body) {
                Ok(()) => {
                    let previous = state.send_replace(target);
                    if previous != target {
                        tracing::info!("Device confirmed power {:?}", target);
                    }
                }
                Err(e) => {
                    tracing::warn!("{}; power state left at {:?}", e, *state.borrow());
                }
            });
    }
}
