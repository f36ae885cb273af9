use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::values::{Timestamp, from_unix_seconds, to_utc};

/// Earliest instant the system can legitimately hold
///
/// Provisioned once (typically at image build time) and only ever read by
/// the validator. A clock reading or network answer earlier than this value
/// is treated as rolled back or spoofed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LowerBound(Timestamp);

impl LowerBound {
    /// Create a lower bound from an instant in any timezone
    pub fn new<Tz: TimeZone>(instant: DateTime<Tz>) -> Self {
        Self(to_utc(&instant))
    }

    /// Create a lower bound from Unix seconds
    ///
    /// Returns `None` for negative values or values chrono cannot represent.
    pub fn from_unix_seconds(secs: i64) -> Option<Self> {
        if secs < 0 {
            return None;
        }
        from_unix_seconds(secs).map(Self)
    }

    /// The bound as a UTC instant
    pub fn timestamp(&self) -> Timestamp {
        self.0
    }

    /// Unix seconds of the bound
    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// Whether `instant` is at or after the bound
    ///
    /// Equality is admitted: a clock that reads exactly the bound is valid.
    pub fn admits<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
        to_utc(instant) >= self.0
    }
}

impl fmt::Display for LowerBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.0.timestamp())
    }
}

impl From<LowerBound> for Timestamp {
    fn from(bound: LowerBound) -> Self {
        bound.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};

    #[test]
    fn test_from_unix_seconds() {
        let bound = LowerBound::from_unix_seconds(1_700_000_000).unwrap();
        assert_eq!(bound.unix_seconds(), 1_700_000_000);

        assert!(LowerBound::from_unix_seconds(-1).is_none());
        assert!(LowerBound::from_unix_seconds(i64::MAX).is_none());
    }

    #[test]
    fn test_admits_is_inclusive() {
        let bound = LowerBound::from_unix_seconds(1_700_000_000).unwrap();
        let at = bound.timestamp();

        assert!(bound.admits(&at));
        assert!(bound.admits(&(at + Duration::seconds(1))));
        assert!(!bound.admits(&(at - Duration::seconds(1))));
    }

    #[test]
    fn test_admits_normalizes_timezone() {
        let bound = LowerBound::from_unix_seconds(1_700_000_000).unwrap();

        // Same instant expressed at UTC-05:00 reads "earlier" on the wall clock
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let local = bound.timestamp().with_timezone(&tz);
        assert!(bound.admits(&local));

        // One second later at UTC+09:00 is still after the bound
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let ahead = (bound.timestamp() + Duration::seconds(1)).with_timezone(&tz);
        assert!(bound.admits(&ahead));
    }
}
