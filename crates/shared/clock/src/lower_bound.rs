use std::path::{Path, PathBuf};

use log::debug;
use timeguard_core::LowerBound;
use timeguard_ports::{ConfigError, ConfigResult, LowerBoundSource};

/// Default location of the provisioned timestamp
pub const DEFAULT_TIMESTAMP_PATH: &str = "/etc/timestamp";

/// Parse the text content of a timestamp file
///
/// The content is a single decimal count of Unix seconds, optionally wrapped
/// in whitespace or followed by a newline.
pub fn parse_lower_bound(content: &str) -> ConfigResult<LowerBound> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty);
    }

    let secs: i64 = trimmed.parse().map_err(|e: std::num::ParseIntError| {
        ConfigError::Malformed {
            content: trimmed.to_string(),
            reason: e.to_string(),
        }
    })?;

    if secs < 0 {
        return Err(ConfigError::Negative(secs));
    }

    LowerBound::from_unix_seconds(secs).ok_or(ConfigError::OutOfRange(secs))
}

/// Lower bound stored in a text file
#[derive(Debug, Clone)]
pub struct FileLowerBound {
    path: PathBuf,
}

impl FileLowerBound {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileLowerBound {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESTAMP_PATH)
    }
}

impl LowerBoundSource for FileLowerBound {
    fn load(&self) -> ConfigResult<LowerBound> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Io {
            path: self.path.display().to_string(),
            error: e.to_string(),
        })?;

        let bound = parse_lower_bound(&content)?;
        debug!("Loaded lower bound {} from {}", bound, self.path.display());
        Ok(bound)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Lower bound known at construction time
#[derive(Debug, Clone, Copy)]
pub struct FixedLowerBound(LowerBound);

impl FixedLowerBound {
    pub fn new(bound: LowerBound) -> Self {
        Self(bound)
    }
}

impl LowerBoundSource for FixedLowerBound {
    fn load(&self) -> ConfigResult<LowerBound> {
        Ok(self.0)
    }

    fn describe(&self) -> String {
        format!("fixed {}", self.0)
    }
}
