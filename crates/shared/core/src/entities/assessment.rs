use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::LowerBound;
use crate::values::Timestamp;

/// Result of comparing a clock reading against the lower bound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockAssessment {
    /// Reading is at or after the bound
    Trusted,
    /// Reading is before the bound by `behind`
    RolledBack { behind: Duration },
}

impl ClockAssessment {
    /// Compare a hardware clock reading with the lower bound
    pub fn of(reading: Timestamp, bound: &LowerBound) -> Self {
        if bound.admits(&reading) {
            ClockAssessment::Trusted
        } else {
            ClockAssessment::RolledBack {
                behind: bound.timestamp() - reading,
            }
        }
    }

    pub fn is_trusted(&self) -> bool {
        matches!(self, ClockAssessment::Trusted)
    }
}

/// Decision on an instant obtained from a trusted time source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceVerdict {
    /// Instant is plausible and may be written to the hardware clock
    Accept(Timestamp),
    /// Instant is earlier than the bound; the answer is treated as spoofed
    Spoofed {
        trusted: Timestamp,
        lower_bound: Timestamp,
    },
}

impl SourceVerdict {
    pub fn of(trusted: Timestamp, bound: &LowerBound) -> Self {
        if bound.admits(&trusted) {
            SourceVerdict::Accept(trusted)
        } else {
            SourceVerdict::Spoofed {
                trusted,
                lower_bound: bound.timestamp(),
            }
        }
    }
}
