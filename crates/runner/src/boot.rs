//! Boot - wires configuration to adapters and acts on the validation result
//!
//! The validator only decides; this module turns its decision into boot
//! behavior:
//! - Clock valid: continue booting
//! - Clock corrected: request a reboot through the configured boot flow
//! - Anything else: stop, with an exit status per failure class

use std::sync::Arc;

use chrono::Utc;
use log::{error, info};
use timeguard_clock::{FileLowerBound, RtcDevice, SimulatedRtc, SntpSource};
use timeguard_ports::{BootFlow, ClockDevice};
use timeguard_validator::{CancelToken, ClockValidator, ValidationError, ValidationOutcome};

use crate::config::{RebootMode, RunnerConfig};
use crate::reboot::{LoggingReboot, SyscallReboot};

/// Terminal state of one boot run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootStatus {
    /// Clock already trustworthy, boot may continue
    ClockValid,
    /// Clock corrected and reboot requested
    RebootRequested,
    /// Runner or lower-bound configuration unusable
    ConfigError,
    /// RTC could not be opened, read or written
    DeviceError,
    /// Trusted time source answered before the lower bound
    SpoofDetected,
    /// Recovery aborted by a signal
    Cancelled,
    /// Bounded retry policy ran out of attempts
    AttemptsExhausted,
    /// Clock corrected but the reboot request failed
    RebootFailed,
}

impl BootStatus {
    /// Process exit code
    pub fn exit_code(&self) -> i32 {
        match self {
            BootStatus::ClockValid | BootStatus::RebootRequested => 0,
            BootStatus::ConfigError => 2,
            BootStatus::DeviceError => 3,
            BootStatus::SpoofDetected => 4,
            BootStatus::Cancelled => 5,
            BootStatus::AttemptsExhausted => 6,
            BootStatus::RebootFailed => 7,
        }
    }

    /// Whether the boot sequence may go on in-process
    pub fn may_continue(&self) -> bool {
        matches!(self, BootStatus::ClockValid)
    }
}

impl From<&ValidationError> for BootStatus {
    fn from(err: &ValidationError) -> Self {
        match err {
            ValidationError::Config(_) => BootStatus::ConfigError,
            ValidationError::Device(_) => BootStatus::DeviceError,
            ValidationError::SpoofDetected { .. } => BootStatus::SpoofDetected,
            ValidationError::Cancelled { .. } => BootStatus::Cancelled,
            ValidationError::AttemptsExhausted { .. } => BootStatus::AttemptsExhausted,
        }
    }
}

/// One boot-time validation with its boot flow
pub struct Boot {
    validator: ClockValidator,
    boot_flow: Arc<dyn BootFlow>,
}

impl Boot {
    pub fn new(validator: ClockValidator, boot_flow: Arc<dyn BootFlow>) -> Self {
        Self {
            validator,
            boot_flow,
        }
    }

    /// Real hardware: file lower bound, RTC device, SNTP, configured reboot
    pub fn from_config(config: &RunnerConfig, cancel: CancelToken) -> Self {
        let device: Arc<dyn ClockDevice> = match &config.rtc_device {
            Some(path) => Arc::new(RtcDevice::new(path)),
            None => Arc::new(RtcDevice::discover()),
        };
        let boot_flow: Arc<dyn BootFlow> = match config.reboot {
            RebootMode::Syscall => Arc::new(SyscallReboot),
            RebootMode::LogOnly => Arc::new(LoggingReboot::new()),
        };

        Self::new(Self::validator(config, device, cancel), boot_flow)
    }

    /// Dry run: real lower bound and time server, simulated RTC seeded from
    /// the host clock, reboot only logged
    pub fn dry_run(config: &RunnerConfig, cancel: CancelToken) -> Self {
        let device = Arc::new(SimulatedRtc::new(Utc::now()).with_name("dry-run RTC"));
        Self::new(
            Self::validator(config, device, cancel),
            Arc::new(LoggingReboot::new()),
        )
    }

    fn validator(
        config: &RunnerConfig,
        device: Arc<dyn ClockDevice>,
        cancel: CancelToken,
    ) -> ClockValidator {
        let source =
            SntpSource::new(config.ntp_server.clone()).with_timeout(config.query_timeout());

        ClockValidator::new(
            Arc::new(FileLowerBound::new(config.timestamp_path.clone())),
            device,
            Arc::new(source),
        )
        .with_retry_policy(config.retry_policy())
        .with_cancel_token(cancel)
    }

    /// Validate the clock and act on the result
    pub async fn run(&self) -> BootStatus {
        match self.validator.validate().await {
            Ok(ValidationOutcome::AlreadyValid { reading }) => {
                info!("System time is valid: {}", reading);
                BootStatus::ClockValid
            }
            Ok(ValidationOutcome::RecoveredAndUpdated { instant, reboot }) => {
                info!("RTC set to {}. {}", instant, reboot.reason);
                match self.boot_flow.request_reboot(&reboot.reason) {
                    Ok(()) => BootStatus::RebootRequested,
                    Err(e) => {
                        error!("{} failed: {}", self.boot_flow.name(), e);
                        BootStatus::RebootFailed
                    }
                }
            }
            Err(err) => {
                if err.is_security_violation() {
                    error!("SECURITY: {}", err);
                } else {
                    error!("Time validation failed: {}", err);
                }
                BootStatus::from(&err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timeguard_ports::{ConfigError, DeviceError, NetworkError};

    #[test]
    fn test_exit_codes_are_distinct_for_failures() {
        let failures = [
            BootStatus::ConfigError,
            BootStatus::DeviceError,
            BootStatus::SpoofDetected,
            BootStatus::Cancelled,
            BootStatus::AttemptsExhausted,
            BootStatus::RebootFailed,
        ];
        let mut codes: Vec<i32> = failures.iter().map(BootStatus::exit_code).collect();
        codes.sort();
        codes.dedup();

        assert_eq!(codes.len(), failures.len());
        assert!(!codes.contains(&0));
        assert_eq!(BootStatus::ClockValid.exit_code(), 0);
        assert_eq!(BootStatus::RebootRequested.exit_code(), 0);
    }

    #[test]
    fn test_status_from_validation_error() {
        assert_eq!(
            BootStatus::from(&ValidationError::Config(ConfigError::Empty)),
            BootStatus::ConfigError
        );
        let device = ValidationError::Device(DeviceError::Open("ENOENT".to_string()));
        assert_eq!(BootStatus::from(&device), BootStatus::DeviceError);
        assert_eq!(
            BootStatus::from(&ValidationError::AttemptsExhausted {
                attempts: 3,
                last_error: NetworkError::Timeout("pool".to_string()),
            }),
            BootStatus::AttemptsExhausted
        );
    }

    #[test]
    fn test_only_valid_clock_continues() {
        assert!(BootStatus::ClockValid.may_continue());
        assert!(!BootStatus::RebootRequested.may_continue());
        assert!(!BootStatus::SpoofDetected.may_continue());
    }
}
