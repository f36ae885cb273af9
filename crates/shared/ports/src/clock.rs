use timeguard_core::Timestamp;

use crate::error::DeviceResult;

/// Port for a hardware clock device (RTC)
///
/// Opening yields an exclusively owned handle; the validator opens the device
/// once per run, reads it once and writes it at most once.
pub trait ClockDevice: Send + Sync {
    /// Open the device
    fn open(&self) -> DeviceResult<Box<dyn HardwareClock>>;

    /// Device identifier for logging
    fn name(&self) -> &str {
        "ClockDevice"
    }
}

/// Open handle on a hardware clock
pub trait HardwareClock: Send {
    /// Read the current time held by the clock
    fn read(&mut self) -> DeviceResult<Timestamp>;

    /// Overwrite the time held by the clock
    fn set(&mut self, instant: Timestamp) -> DeviceResult<()>;
}
