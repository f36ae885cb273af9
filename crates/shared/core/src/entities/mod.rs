mod assessment;
mod lower_bound;
mod outcome;

pub use assessment::{ClockAssessment, SourceVerdict};
pub use lower_bound::LowerBound;
pub use outcome::{CLOCK_CORRECTED_REASON, RebootDirective, ValidationOutcome};
