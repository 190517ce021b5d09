//! Maps service errors to parasol_core::AppError for consistent user-facing messages.
//! Each service has its own module to keep mappings small and readable.

use parasol_core::AppError;

mod device;
mod weather;

/// Conversion of a service crate's error into the application hierarchy.
pub trait IntoAppError {
    fn into_app_error(self) -> AppError;
}
