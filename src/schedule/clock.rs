//! Wall-clock source for open-ended shifts.
//!
//! The UI reads the clock once per frame and hands the time down, so the
//! layout code itself never touches ambient state.

use chrono::{Local, NaiveTime};

pub trait Clock {
    fn now(&self) -> NaiveTime;
}

/// Local time of day from the OS
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// Always reports the same time
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}
