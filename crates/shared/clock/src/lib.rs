//! Timeguard Clock Adapters
//!
//! Concrete implementations of the timeguard ports:
//!
//! ## Adapters
//!
//! ```text
//! LowerBoundSource   ── FileLowerBound     (/etc/timestamp, Unix seconds)
//!                    └─ FixedLowerBound    (constant)
//!
//! ClockDevice        ── RtcDevice          (/dev/rtc*, RTC_RD_TIME / RTC_SET_TIME)
//!                    └─ SimulatedRtc       (in-memory, failure injection)
//!
//! TrustedTimeSource  ── SntpSource         (single SNTPv4 query over UDP)
//!                    └─ ScriptedTimeSource (scripted answers, attempt counter)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use timeguard_clock::{FileLowerBound, RtcDevice, SntpSource};
//!
//! let bound = FileLowerBound::new("/etc/timestamp");
//! let rtc = RtcDevice::new("/dev/rtc0");
//! let ntp = SntpSource::new("0.beevik-ntp.pool.ntp.org:123");
//! ```

mod lower_bound;
#[cfg(unix)]
mod rtc;
mod simulated;
mod sntp;

pub use lower_bound::{DEFAULT_TIMESTAMP_PATH, FileLowerBound, FixedLowerBound, parse_lower_bound};
#[cfg(unix)]
pub use rtc::{RTC_CANDIDATES, RtcDevice};
pub use simulated::{ScriptedTimeSource, SimulatedRtc};
pub use sntp::{DEFAULT_NTP_SERVER, DEFAULT_QUERY_TIMEOUT, SntpSource};

// Re-export the ports for convenience
pub use timeguard_ports::{ClockDevice, HardwareClock, LowerBoundSource, TrustedTimeSource};
