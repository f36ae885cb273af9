//! Boot flow adapters
//!
//! - `SyscallReboot`: flushes filesystems and restarts the machine
//! - `LoggingReboot`: records the request and returns, for development
//!   images and dry runs

use log::{info, warn};
use parking_lot::Mutex;
use timeguard_ports::{BootError, BootFlow, BootResult};

/// Restart through `reboot(2)`
///
/// Requires `CAP_SYS_BOOT`. On success the call does not return.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyscallReboot;

impl BootFlow for SyscallReboot {
    fn request_reboot(&self, reason: &str) -> BootResult<()> {
        warn!("Rebooting: {}", reason);

        // SAFETY: sync(2) has no preconditions.
        unsafe { libc::sync() };
        // SAFETY: RB_AUTOBOOT takes no argument; failure is reported via errno.
        let ret = unsafe { libc::reboot(libc::RB_AUTOBOOT) };
        if ret < 0 {
            return Err(BootError::Reboot(
                std::io::Error::last_os_error().to_string(),
            ));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "SyscallReboot"
    }
}

/// Log reboot requests without acting on them
#[derive(Debug, Default)]
pub struct LoggingReboot {
    requests: Mutex<Vec<String>>,
}

impl LoggingReboot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reasons of every request received, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}

impl BootFlow for LoggingReboot {
    fn request_reboot(&self, reason: &str) -> BootResult<()> {
        info!("Reboot requested (not performed): {}", reason);
        self.requests.lock().push(reason.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "LoggingReboot"
    }
}
