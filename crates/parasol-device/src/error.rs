use thiserror::Error;

/// Device channel errors
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Invalid device address {address}: {source}")]
    InvalidBaseUrl {
        address: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),

    #[error("No async runtime available to run device requests")]
    NoRuntime,

    #[error("Unknown device command: {0:?}")]
    UnknownCommand(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Device returned HTTP {status}")]
    Http { status: u16 },

    /// The device answered, but not with the token that confirms the transition.
    #[error("Device replied {actual:?}, expected {expected:?}")]
    ConfirmationMismatch {
        expected: &'static str,
        actual: String,
    },
}

impl DeviceError {
    /// Whether the device never produced a usable answer (as opposed to answering wrongly).
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Timeout | Self::Network(_))
    }
}
