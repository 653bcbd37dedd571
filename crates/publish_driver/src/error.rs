use thiserror::Error;

/// Failures on the automation wire itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("device unreachable: {0}")]
    Transport(String),
    #[error("device rpc {method} failed ({code}): {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },
    #[error("device shell command failed: {0}")]
    Shell(String),
    #[error("unexpected device response: {0}")]
    Parse(String),
}

/// Why publishing stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("no device configured; set GALAXY_IP to the device serial or IP")]
    MissingDeviceConfig,
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error("{element} not found on screen; inspect the current view hierarchy")]
    ElementNotFound { element: String },
}

impl DriverError {
    pub(crate) fn not_found(element: impl Into<String>) -> Self {
        DriverError::ElementNotFound {
            element: element.into(),
        }
    }
}
