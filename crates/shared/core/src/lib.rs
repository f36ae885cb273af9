//! Timeguard Core Domain
//!
//! Pure domain types for boot-time clock validation.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    CLOCK_CORRECTED_REASON, ClockAssessment, LowerBound, RebootDirective, SourceVerdict,
    ValidationOutcome,
};
pub use values::{Timestamp, from_unix_seconds, to_utc};
