//! Time-of-day policy
//!
//! Heating is only wanted while people are around the printer. The window is
//! a closed range of local hours; the wall clock is read through [`Clock`] so
//! the decision pipeline can be driven with a fixed hour in tests.

use chrono::{Local, Timelike};
use serde::{Deserialize, Serialize};

/// Default first hour of the working day (inclusive)
pub const DEFAULT_START_HOUR: u32 = 8;

/// Default last hour of the working day (inclusive)
pub const DEFAULT_END_HOUR: u32 = 18;

/// Inclusive range of local hours during which the bed may be heated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkHours {
    /// First hour of the window, 0-23
    pub start_hour: u32,

    /// Last hour of the window, 0-23, inclusive
    pub end_hour: u32,
}

impl Default for WorkHours {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
        }
    }
}

impl WorkHours {
    /// Whether `hour` falls inside the window
    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start_hour && hour <= self.end_hour
    }

    /// Whether the clock currently reads a work hour
    pub fn is_work_hours(&self, clock: &dyn Clock) -> bool {
        self.contains(clock.local_hour())
    }
}

/// Source of the current local hour-of-day
pub trait Clock: Send + Sync {
    /// Hour of the day in local time, 0-23
    fn local_hour(&self) -> u32;
}

/// Wall clock in the system's local timezone, as-is
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn local_hour(&self) -> u32 {
        Local::now().hour()
    }
}

/// Clock pinned to one hour
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u32);

impl Clock for FixedClock {
    fn local_hour(&self) -> u32 {
        self.0
    }
}

/// Whether the local wall clock is within the default 08-18 window
pub fn is_work_hours() -> bool {
    WorkHours::default().is_work_hours(&SystemClock)
}
