use parasol_core::{AppError, ConfigError, DeviceError as CoreDeviceError};
use parasol_device::DeviceError;

use super::IntoAppError;

impl IntoAppError for DeviceError {
    fn into_app_error(self) -> AppError {
        match self {
            DeviceError::Timeout => AppError::Device(CoreDeviceError::Timeout),
            DeviceError::Network(cause) => AppError::Device(CoreDeviceError::Unreachable(cause)),
            DeviceError::Http { status } => AppError::Device(CoreDeviceError::Rejected(status)),
            DeviceError::ConfirmationMismatch { expected, actual } => {
                AppError::Device(CoreDeviceError::NotConfirmed {
                    expected: expected.to_string(),
                    actual,
                })
            }
            e @ DeviceError::InvalidBaseUrl { .. } => {
                AppError::Config(ConfigError::Invalid(e.to_string()))
            }
            e => AppError::Other(e.into()),
        }
    }
}
