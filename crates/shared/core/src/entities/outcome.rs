use serde::{Deserialize, Serialize};

use crate::values::Timestamp;

/// Reason logged and handed to the boot flow after the clock was corrected
pub const CLOCK_CORRECTED_REASON: &str = "Set system time. Need reboot.";

/// Directive that the boot sequence must restart before continuing
///
/// State formed earlier in the boot (certificate checks, log stamps) was
/// built on the rolled-back clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebootDirective {
    pub reason: String,
}

impl RebootDirective {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// Directive issued after the hardware clock was rewritten
    pub fn clock_corrected() -> Self {
        Self::new(CLOCK_CORRECTED_REASON)
    }
}

/// Successful result of one validation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationOutcome {
    /// Hardware clock was already at or after the lower bound
    AlreadyValid { reading: Timestamp },
    /// Hardware clock was rewritten from the trusted source; reboot required
    RecoveredAndUpdated {
        instant: Timestamp,
        reboot: RebootDirective,
    },
}

impl ValidationOutcome {
    pub fn recovered(instant: Timestamp) -> Self {
        ValidationOutcome::RecoveredAndUpdated {
            instant,
            reboot: RebootDirective::clock_corrected(),
        }
    }

    /// The instant the hardware clock holds after the run
    pub fn instant(&self) -> Timestamp {
        match self {
            ValidationOutcome::AlreadyValid { reading } => *reading,
            ValidationOutcome::RecoveredAndUpdated { instant, .. } => *instant,
        }
    }

    /// The reboot directive, if the run requires one
    pub fn reboot(&self) -> Option<&RebootDirective> {
        match self {
            ValidationOutcome::AlreadyValid { .. } => None,
            ValidationOutcome::RecoveredAndUpdated { reboot, .. } => Some(reboot),
        }
    }

    pub fn requires_reboot(&self) -> bool {
        self.reboot().is_some()
    }
}
