mod types;
mod client;
mod time;

pub use types::*;
pub use client::ScheduleClient;
pub use time::{format_clock_time, parse_clock_input, snap_to_quarter, week_start};
