use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, Timelike};
use log::debug;
use timeguard_core::Timestamp;
use timeguard_ports::{ClockDevice, DeviceError, DeviceResult, HardwareClock};

/// Device nodes probed when no explicit path is configured
pub const RTC_CANDIDATES: [&str; 3] = ["/dev/rtc", "/dev/rtc0", "/dev/misc/rtc0"];

/// `_IOR('p', 0x09, struct rtc_time)`
const RTC_RD_TIME: u32 = 0x8024_7009;
/// `_IOW('p', 0x0a, struct rtc_time)`
const RTC_SET_TIME: u32 = 0x4024_700a;

/// Kernel `struct rtc_time`
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RtcTime {
    tm_sec: libc::c_int,
    tm_min: libc::c_int,
    tm_hour: libc::c_int,
    tm_mday: libc::c_int,
    tm_mon: libc::c_int,
    tm_year: libc::c_int,
    tm_wday: libc::c_int,
    tm_yday: libc::c_int,
    tm_isdst: libc::c_int,
}

impl RtcTime {
    /// Interpret the broken-down fields as UTC
    fn to_timestamp(self) -> DeviceResult<Timestamp> {
        let invalid = || DeviceError::InvalidTime(format!("{:?}", self));

        let month = u32::try_from(self.tm_mon + 1).map_err(|_| invalid())?;
        let day = u32::try_from(self.tm_mday).map_err(|_| invalid())?;
        let hour = u32::try_from(self.tm_hour).map_err(|_| invalid())?;
        let min = u32::try_from(self.tm_min).map_err(|_| invalid())?;
        let sec = u32::try_from(self.tm_sec).map_err(|_| invalid())?;

        NaiveDate::from_ymd_opt(self.tm_year + 1900, month, day)
            .and_then(|date| date.and_hms_opt(hour, min, sec))
            .map(|naive| naive.and_utc())
            .ok_or_else(invalid)
    }

    fn from_timestamp(instant: Timestamp) -> DeviceResult<Self> {
        let year = instant.year() - 1900;
        if year < 0 {
            return Err(DeviceError::InvalidTime(format!(
                "{} predates the RTC epoch",
                instant
            )));
        }

        // Fields below are bounded by chrono (month < 12, ordinal < 366, ...)
        Ok(Self {
            tm_sec: instant.second() as libc::c_int,
            tm_min: instant.minute() as libc::c_int,
            tm_hour: instant.hour() as libc::c_int,
            tm_mday: instant.day() as libc::c_int,
            tm_mon: instant.month0() as libc::c_int,
            tm_year: year,
            tm_wday: instant.weekday().num_days_from_sunday() as libc::c_int,
            tm_yday: instant.ordinal0() as libc::c_int,
            tm_isdst: 0,
        })
    }
}

/// Linux RTC character device
///
/// The RTC is assumed to keep UTC, which is the Linux convention and what
/// `hwclock --utc` writes.
#[derive(Debug, Clone)]
pub struct RtcDevice {
    paths: Vec<PathBuf>,
    name: String,
}

impl RtcDevice {
    /// Use a single device node
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self {
            paths: vec![path],
            name,
        }
    }

    /// Probe the usual device nodes in order
    pub fn discover() -> Self {
        Self {
            paths: RTC_CANDIDATES.iter().map(PathBuf::from).collect(),
            name: "rtc".to_string(),
        }
    }

    fn open_first(&self) -> DeviceResult<(File, &Path)> {
        let mut last_error = None;
        for path in &self.paths {
            match File::open(path) {
                Ok(file) => return Ok((file, path)),
                Err(e) => {
                    debug!("Cannot open {}: {}", path.display(), e);
                    last_error = Some(format!("{}: {}", path.display(), e));
                }
            }
        }
        Err(DeviceError::Open(
            last_error.unwrap_or_else(|| "no device path configured".to_string()),
        ))
    }
}

impl Default for RtcDevice {
    fn default() -> Self {
        Self::discover()
    }
}

impl ClockDevice for RtcDevice {
    fn open(&self) -> DeviceResult<Box<dyn HardwareClock>> {
        let (file, path) = self.open_first()?;
        debug!("Opened RTC {}", path.display());
        Ok(Box::new(RtcHandle { file }))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Open RTC file descriptor
struct RtcHandle {
    file: File,
}

impl HardwareClock for RtcHandle {
    fn read(&mut self) -> DeviceResult<Timestamp> {
        let mut tm = RtcTime::default();
        // SAFETY: fd is open for the lifetime of `self.file`, and `tm` matches
        // the kernel's `struct rtc_time` layout expected by RTC_RD_TIME.
        let ret = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                RTC_RD_TIME as _,
                &mut tm as *mut RtcTime,
            )
        };
        if ret < 0 {
            return Err(DeviceError::Read(io::Error::last_os_error().to_string()));
        }
        tm.to_timestamp()
    }

    fn set(&mut self, instant: Timestamp) -> DeviceResult<()> {
        let tm = RtcTime::from_timestamp(instant)?;
        // SAFETY: as in `read`; RTC_SET_TIME only reads from `tm`.
        let ret = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                RTC_SET_TIME as _,
                &tm as *const RtcTime,
            )
        };
        if ret < 0 {
            return Err(DeviceError::Write(io::Error::last_os_error().to_string()));
        }
        Ok(())
    }
}
