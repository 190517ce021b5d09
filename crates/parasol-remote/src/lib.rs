//! Session layer the presentation talks to.
//!
//! Owns the device components and the weather fetcher, runs the two startup
//! paths, and exposes confirmed state as watchable signals and view snapshots.

pub mod error_mapping;
pub mod session;
pub mod view;

pub use error_mapping::IntoAppError;
pub use session::RemoteSession;
pub use view::{RemoteView, ViewWatcher};
