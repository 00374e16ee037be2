use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by a device-access implementation.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("not supported by this device: {0}")]
    Unsupported(String),
    #[error("unexpected device response: {0}")]
    Protocol(String),
}

impl DeviceError {
    /// True when elevated privileges might let the operation succeed.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            DeviceError::PermissionDenied(_) => true,
            DeviceError::Io(err) => err.kind() == io::ErrorKind::PermissionDenied,
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum InkpadError {
    #[error("no printer found")]
    NoDeviceFound,

    #[error("device index {index} is out of range ({available} printer(s) found)")]
    DeviceIndexOutOfRange { index: usize, available: usize },

    #[error("failed to enumerate printers: {0}")]
    Enumeration(#[source] DeviceError),

    #[error("no waste or platen pad counters available for model '{model}'")]
    NoCountersAvailable { model: String },

    #[error("failed to read counter group '{group}' at {addresses}: {source}")]
    DeviceRead {
        group: String,
        addresses: String,
        #[source]
        source: DeviceError,
    },

    #[error("{operation} failed: {reason}. Run a status report to check the actual counter values")]
    DeviceWrite { operation: String, reason: String },

    #[error("malformed address list '{input}': {reason}")]
    MalformedAddressInput { input: String, reason: String },

    #[error("invalid configuration in {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InkpadError {
    /// The device-level cause, if this error came from the device.
    pub fn device_cause(&self) -> Option<&DeviceError> {
        match self {
            InkpadError::DeviceRead { source, .. } => Some(source),
            _ => None,
        }
    }
}
