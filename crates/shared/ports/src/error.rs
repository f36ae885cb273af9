use thiserror::Error;

/// Lower-bound storage missing or malformed
///
/// Always fatal: there is no safe default lower bound.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read timestamp storage {path}: {error}")]
    Io { path: String, error: String },

    #[error("Timestamp storage is empty")]
    Empty,

    #[error("Malformed timestamp {content:?}: {reason}")]
    Malformed { content: String, reason: String },

    #[error("Negative timestamp: {0}")]
    Negative(i64),

    #[error("Timestamp out of range: {0}")]
    OutOfRange(i64),
}

/// Hardware clock failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    #[error("opening RTC failed: {0}")]
    Open(String),

    #[error("reading RTC failed: {0}")]
    Read(String),

    #[error("writing RTC failed: {0}")]
    Write(String),

    #[error("RTC holds an invalid time: {0}")]
    InvalidTime(String),
}

/// Per-attempt failure of a trusted time source
///
/// Treated as transient by the validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Failed to resolve {0}")]
    Unresolved(String),

    #[error("Network I/O error: {0}")]
    Io(String),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<std::io::Error> for NetworkError {
    fn from(err: std::io::Error) -> Self {
        NetworkError::Io(err.to_string())
    }
}

/// Failure to hand control back to the boot system
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BootError {
    #[error("Reboot request failed: {0}")]
    Reboot(String),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type DeviceResult<T> = std::result::Result<T, DeviceError>;
pub type NetworkResult<T> = std::result::Result<T, NetworkError>;
pub type BootResult<T> = std::result::Result<T, BootError>;
