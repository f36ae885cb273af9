//! Error types for clock validation

use thiserror::Error;
use timeguard_core::Timestamp;
use timeguard_ports::{ConfigError, DeviceError, NetworkError};

/// Terminal failures of a validation run
///
/// Per-attempt network errors never appear here directly: they are retried,
/// and only surface inside `AttemptsExhausted` when the retry policy is
/// bounded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("NTP spoof may have happened: trusted time {trusted} is before lower bound {lower_bound}")]
    SpoofDetected {
        trusted: Timestamp,
        lower_bound: Timestamp,
    },

    #[error("No trusted time after {attempts} attempts, last error: {last_error}")]
    AttemptsExhausted {
        attempts: u32,
        last_error: NetworkError,
    },

    #[error("Validation cancelled after {attempts} attempts")]
    Cancelled { attempts: u32 },
}

impl ValidationError {
    /// Whether the failure is a rejected time answer rather than a fault
    pub fn is_security_violation(&self) -> bool {
        matches!(self, ValidationError::SpoofDetected { .. })
    }
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
