//! Timeguard Validator
//!
//! Establishes a trustworthy clock early in boot, before anything that
//! depends on certificate validity periods runs.
//!
//! ## State Machine
//!
//! ```text
//!   Init ── load lower bound ──────────────────────────► ConfigError
//!    │
//!    ├──── open + read RTC ────────────────────────────► DeviceError
//!    ▼
//!   Checking ── RTC >= bound ──────────────────────────► AlreadyValid
//!    │
//!    ▼ RTC < bound
//!   Recovering ── fetch fails ── wait interval ──┐
//!    │    ▲                                      │
//!    │    └──────────────────────────────────────┘  (cancel ► Cancelled)
//!    ▼ fetch succeeds
//!   Evaluating ── trusted < bound ─────────────────────► SpoofDetected (RTC untouched)
//!    │
//!    ├──── write RTC fails ────────────────────────────► DeviceError
//!    ▼
//!   RecoveredAndUpdated (reboot required)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use timeguard_clock::{FileLowerBound, RtcDevice, SntpSource};
//! use timeguard_validator::{ClockValidator, RetryPolicy};
//!
//! let validator = ClockValidator::new(
//!     Arc::new(FileLowerBound::new("/etc/timestamp")),
//!     Arc::new(RtcDevice::new("/dev/rtc0")),
//!     Arc::new(SntpSource::default()),
//! )
//! .with_retry_policy(RetryPolicy::default());
//!
//! match validator.validate().await? {
//!     ValidationOutcome::AlreadyValid { .. } => { /* continue booting */ }
//!     ValidationOutcome::RecoveredAndUpdated { reboot, .. } => { /* restart */ }
//! }
//! ```

pub mod cancel;
pub mod error;
pub mod retry;
pub mod validator;

// Re-export main types
pub use cancel::CancelToken;
pub use error::{ValidationError, ValidationResult};
pub use retry::{DEFAULT_RETRY_INTERVAL, RetryPolicy};
pub use validator::ClockValidator;

// Re-export domain outcome types for convenience
pub use timeguard_core::{RebootDirective, ValidationOutcome};
