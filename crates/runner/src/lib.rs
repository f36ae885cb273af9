//! Timeguard Runner - Boot-Time Clock Validation
//!
//! Runs once, early in boot, before anything checks certificate validity:
//!
//! - **Config**: JSON runner configuration with stock defaults
//! - **Boot**: builds the validator from config and acts on its result
//! - **Reboot**: boot flow adapters (reboot syscall, log only)
//! - **Shutdown**: SIGINT/SIGTERM cancel a pending validation
//!
//! ## Flow
//!
//! ```text
//!   RunnerConfig ──► Boot::from_config
//!                        │
//!                        ▼
//!   /etc/timestamp ─► ClockValidator ◄─► /dev/rtc*
//!                        │    ▲
//!                        │    └── SNTP (only when the RTC is rolled back)
//!                        ▼
//!                    BootStatus ──► continue │ reboot │ halt (exit code)
//! ```

pub mod boot;
pub mod config;
pub mod reboot;
pub mod shutdown;

// Re-export main types
pub use boot::{Boot, BootStatus};
pub use config::{ConfigError, RebootMode, RunnerConfig};
pub use reboot::{LoggingReboot, SyscallReboot};
pub use shutdown::{cancel_on_shutdown, shutdown_signal};
