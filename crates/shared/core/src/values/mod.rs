use chrono::{DateTime, TimeZone, Utc};

/// Instant in UTC
///
/// Every instant handled by timeguard is carried in this type, so any
/// comparison between a clock reading and the lower bound is a UTC comparison.
pub type Timestamp = DateTime<Utc>;

/// Normalize an instant from any timezone to UTC
pub fn to_utc<Tz: TimeZone>(instant: &DateTime<Tz>) -> Timestamp {
    instant.with_timezone(&Utc)
}

/// Build a timestamp from Unix seconds, `None` when out of chrono's range
pub fn from_unix_seconds(secs: i64) -> Option<Timestamp> {
    DateTime::from_timestamp(secs, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_to_utc_keeps_instant() {
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let local = tz.with_ymd_and_hms(2023, 11, 15, 7, 13, 20).unwrap();

        let utc = to_utc(&local);
        assert_eq!(utc.timestamp(), local.timestamp());
        assert_eq!(utc.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_from_unix_seconds_range() {
        assert_eq!(from_unix_seconds(0).unwrap().timestamp(), 0);
        assert!(from_unix_seconds(i64::MAX).is_none());
    }
}
