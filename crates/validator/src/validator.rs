//! Clock Validator
//!
//! Decides whether the hardware clock can be trusted at boot:
//! - Loads the provisioned lower bound
//! - Reads the hardware clock once
//! - Falls back to a trusted time source when the clock is rolled back
//! - Rejects trusted answers that are themselves before the lower bound
//! - Writes the hardware clock only after an answer was accepted

use std::sync::Arc;

use log::{error, info, warn};
use timeguard_core::{ClockAssessment, SourceVerdict, Timestamp, ValidationOutcome};
use timeguard_ports::{ClockDevice, LowerBoundSource, TrustedTimeSource};

use crate::cancel::CancelToken;
use crate::error::{ValidationError, ValidationResult};
use crate::retry::RetryPolicy;

/// Boot-time clock validator
///
/// Stateless between runs: every call to [`validate`](Self::validate)
/// re-reads the lower bound and the hardware clock.
pub struct ClockValidator {
    lower_bound: Arc<dyn LowerBoundSource>,
    device: Arc<dyn ClockDevice>,
    source: Arc<dyn TrustedTimeSource>,
    retry: RetryPolicy,
    cancel: CancelToken,
}

impl ClockValidator {
    /// Create a validator that retries forever and is never cancelled
    pub fn new(
        lower_bound: Arc<dyn LowerBoundSource>,
        device: Arc<dyn ClockDevice>,
        source: Arc<dyn TrustedTimeSource>,
    ) -> Self {
        Self {
            lower_bound,
            device,
            source,
            retry: RetryPolicy::default(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Token that aborts the recovery loop
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run one validation
    ///
    /// `Ok(AlreadyValid)` means no network or write activity took place.
    /// `Ok(RecoveredAndUpdated)` means the hardware clock was rewritten and
    /// the caller must restart the boot sequence.
    pub async fn validate(&self) -> ValidationResult<ValidationOutcome> {
        let bound = self.lower_bound.load()?;
        info!(
            "Lower bound: {} (from {})",
            bound,
            self.lower_bound.describe()
        );

        let mut clock = self.device.open()?;
        let reading = clock.read()?;
        info!("Systemtime: {}", reading);

        match ClockAssessment::of(reading, &bound) {
            ClockAssessment::Trusted => return Ok(ValidationOutcome::AlreadyValid { reading }),
            ClockAssessment::RolledBack { behind } => {
                warn!(
                    "Systemtime is invalid: {} is {}s before lower bound",
                    reading,
                    behind.num_seconds()
                );
            }
        }

        info!("Receive time via NTP from {}", self.source.server());
        let trusted = self.recover().await?;

        match SourceVerdict::of(trusted, &bound) {
            SourceVerdict::Spoofed {
                trusted,
                lower_bound,
            } => {
                error!(
                    "NTP spoof may have happened: {} answered {}, before lower bound {}",
                    self.source.server(),
                    trusted,
                    lower_bound
                );
                Err(ValidationError::SpoofDetected {
                    trusted,
                    lower_bound,
                })
            }
            SourceVerdict::Accept(instant) => {
                info!("Update RTC {} to {}", self.device.name(), instant);
                clock.set(instant)?;
                Ok(ValidationOutcome::recovered(instant))
            }
        }
    }

    /// Query the trusted source until it answers
    async fn recover(&self) -> ValidationResult<Timestamp> {
        let server = self.source.server();
        let mut attempts: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                return Err(ValidationError::Cancelled { attempts });
            }

            attempts = attempts.saturating_add(1);
            info!("Query time server {} (attempt {})", server, attempts);

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(ValidationError::Cancelled { attempts });
                }
                result = self.source.fetch() => result,
            };

            let err = match result {
                Ok(instant) => return Ok(instant),
                Err(err) => err,
            };

            warn!("Time server error: {}", err);
            if !self.retry.allows_retry(attempts) {
                return Err(ValidationError::AttemptsExhausted {
                    attempts,
                    last_error: err,
                });
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Err(ValidationError::Cancelled { attempts });
                }
                _ = tokio::time::sleep(self.retry.interval) => {}
            }
        }
    }
}
