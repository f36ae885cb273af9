//! Timeguard Ports
//!
//! Port definitions (traits) for boot-time clock validation.
//! These define the boundaries between the decision logic and the devices,
//! network services and boot machinery it drives.

mod boot;
mod clock;
mod error;
mod lower_bound;
mod time_source;

pub use boot::BootFlow;
pub use clock::{ClockDevice, HardwareClock};
pub use error::{
    BootError, BootResult, ConfigError, ConfigResult, DeviceError, DeviceResult, NetworkError,
    NetworkResult,
};
pub use lower_bound::LowerBoundSource;
pub use time_source::TrustedTimeSource;
