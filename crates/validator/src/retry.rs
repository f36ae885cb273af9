use std::time::Duration;

/// Default wait between trusted time source attempts
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(3);

/// How often and how long to query the trusted time source
///
/// The default retries forever: proceeding with an unvalidated clock is
/// never an option, so only cancellation ends an unbounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fixed wait after a failed attempt
    pub interval: Duration,
    /// Total attempts allowed (`None` = unbounded)
    pub max_attempts: Option<u32>,
}

impl RetryPolicy {
    /// Retry forever with the given interval
    pub fn forever(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    /// At most `max_attempts` attempts (at least one)
    pub fn bounded(max_attempts: u32) -> Self {
        Self {
            interval: DEFAULT_RETRY_INTERVAL,
            max_attempts: Some(max_attempts.max(1)),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Whether another attempt may follow `attempts` failed ones
    pub fn allows_retry(&self, attempts: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempts < max,
            None => true,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::forever(DEFAULT_RETRY_INTERVAL)
    }
}
