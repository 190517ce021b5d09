//! Command and state-synchronization client for the umbrella appliance.
//!
//! The device lives at a fixed LAN address and answers unauthenticated GET
//! requests with short plain-text bodies. Every request here is bounded by a
//! deadline; failures are logged and swallowed, and local state only changes
//! when the device echoes the exact confirmation token.

pub mod command;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod prober;
pub mod toggle;

pub use command::Command;
pub use dispatcher::DeviceDispatcher;
pub use error::DeviceError;
pub use executor::{RequestOutcome, TimedExecutor, DEFAULT_DEADLINE, PROBE_DEADLINE};
pub use prober::{Connectivity, ReachabilityProber, GREETING};
pub use toggle::{PowerState, ToggleReconciler, OFF_CONFIRMATION, ON_CONFIRMATION};
