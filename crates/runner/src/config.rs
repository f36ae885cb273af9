//! Runner configuration
//!
//! Loaded from a JSON file. Every field has a default, so an empty object
//! (or no file at all) yields the stock boot configuration:
//!
//! ```json
//! {
//!   "timestamp_path": "/etc/timestamp",
//!   "rtc_device": null,
//!   "ntp_server": "0.beevik-ntp.pool.ntp.org:123",
//!   "retry_interval_secs": 3,
//!   "max_attempts": null,
//!   "query_timeout_secs": 5,
//!   "reboot": "syscall"
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use timeguard_clock::{DEFAULT_NTP_SERVER, DEFAULT_TIMESTAMP_PATH};
use timeguard_validator::RetryPolicy;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// What to do once the clock has been corrected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RebootMode {
    /// Restart the machine through the reboot syscall
    #[default]
    Syscall,
    /// Only log the request (for development images)
    LogOnly,
}

/// Root configuration for the boot runner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// File holding the provisioned lower bound (Unix seconds)
    pub timestamp_path: PathBuf,

    /// RTC device node; `None` probes the usual nodes
    pub rtc_device: Option<PathBuf>,

    /// Time server as `host` or `host:port`
    pub ntp_server: String,

    /// Wait between failed time server queries
    pub retry_interval_secs: u64,

    /// Give up after this many queries; `None` retries forever
    pub max_attempts: Option<u32>,

    /// Per-query timeout
    pub query_timeout_secs: u64,

    pub reboot: RebootMode,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timestamp_path: PathBuf::from(DEFAULT_TIMESTAMP_PATH),
            rtc_device: None,
            ntp_server: DEFAULT_NTP_SERVER.to_string(),
            retry_interval_secs: 3,
            max_attempts: None,
            query_timeout_secs: 5,
            reboot: RebootMode::Syscall,
        }
    }
}

impl RunnerConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::from_json(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RunnerConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ntp_server.trim().is_empty() {
            return Err(ConfigError::Invalid("ntp_server is empty".to_string()));
        }
        if self.retry_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "retry_interval_secs must be positive".to_string(),
            ));
        }
        if self.query_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "query_timeout_secs must be positive".to_string(),
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(ConfigError::Invalid(
                "max_attempts must be positive or null".to_string(),
            ));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let policy = RetryPolicy::forever(Duration::from_secs(self.retry_interval_secs));
        match self.max_attempts {
            Some(max) => RetryPolicy {
                max_attempts: Some(max),
                ..policy
            },
            None => policy,
        }
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = RunnerConfig::from_json("{}").unwrap();
        assert_eq!(config, RunnerConfig::default());
        assert_eq!(config.timestamp_path, PathBuf::from("/etc/timestamp"));
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_partial_config() {
        let config = RunnerConfig::from_json(
            r#"{
                "ntp_server": "time.example.org",
                "rtc_device": "/dev/rtc1",
                "max_attempts": 10,
                "reboot": "log-only"
            }"#,
        )
        .unwrap();

        assert_eq!(config.ntp_server, "time.example.org");
        assert_eq!(config.rtc_device, Some(PathBuf::from("/dev/rtc1")));
        assert_eq!(config.reboot, RebootMode::LogOnly);
        assert_eq!(config.retry_policy().max_attempts, Some(10));
        assert_eq!(config.retry_policy().interval, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values_rejected() {
        for json in [
            r#"{"retry_interval_secs": 0}"#,
            r#"{"query_timeout_secs": 0}"#,
            r#"{"max_attempts": 0}"#,
            r#"{"ntp_server": " "}"#,
        ] {
            assert!(
                matches!(RunnerConfig::from_json(json), Err(ConfigError::Invalid(_))),
                "{} should be rejected",
                json
            );
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            RunnerConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            RunnerConfig::from_json(r#"{"reboot": "halt"}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            RunnerConfig::from_file("/nonexistent/timeguard.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
