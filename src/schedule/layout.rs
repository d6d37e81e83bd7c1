//! Time-of-day to pixel mapping for the schedule grid.
//!
//! One minute is one pixel at the default scale, and the grid's top edge
//! is hour 1 of the day, not midnight.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::model::{minutes_of_day, parse_clock_time, Shift};

const MINUTES_PER_DAY: i32 = 24 * 60;
/// Last minute of the day, used as the provisional end of an overnight open shift
const END_OF_DAY_MINUTES: i32 = 23 * 60 + 59;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridScale {
    pub pixels_per_hour: f32,
    /// Hour of day drawn at the top edge of the grid
    pub first_hour: u32,
}

impl Default for GridScale {
    fn default() -> Self {
        Self {
            pixels_per_hour: 60.0,
            first_hour: 1,
        }
    }
}

impl GridScale {
    pub fn pixels_per_minute(&self) -> f32 {
        self.pixels_per_hour / 60.0
    }

    /// Total height of the grid from `first_hour` down to midnight
    pub fn grid_height(&self) -> f32 {
        self.visible_hours() as f32 * self.pixels_per_hour
    }

    pub fn visible_hours(&self) -> u32 {
        24u32.saturating_sub(self.first_hour)
    }

    /// Inverse of the vertical mapping: grid-relative y back to minutes of day
    pub fn minutes_at(&self, y: f32) -> i32 {
        (self.first_hour * 60) as i32 + (y / self.pixels_per_minute()) as i32
    }
}

/// Vertical placement of a card, relative to the top of the grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub top: f32,
    pub height: f32,
}

impl Geometry {
    /// Produced for input that could not be parsed
    pub const INVALID: Geometry = Geometry {
        top: f32::NAN,
        height: f32::NAN,
    };

    pub fn is_valid(&self) -> bool {
        self.top.is_finite() && self.height.is_finite()
    }
}

/// Start and end of a shift in minutes since midnight of its date.
///
/// A closed shift whose end is before its start runs into the next day.
/// An open shift ends "now", except when now is earlier than the start:
/// then it is clamped to 23:59 of the same day instead of rolling over.
pub fn interval_minutes(start: NaiveTime, end: Option<NaiveTime>, now: NaiveTime) -> (i32, i32) {
    let start_offset = minutes_of_day(start);

    let end_offset = match end {
        Some(end) => {
            let end_offset = minutes_of_day(end);
            if end_offset < start_offset {
                end_offset + MINUTES_PER_DAY
            } else {
                end_offset
            }
        }
        None => {
            let now_offset = minutes_of_day(now);
            if now_offset < start_offset {
                END_OF_DAY_MINUTES
            } else {
                now_offset
            }
        }
    };

    (start_offset, end_offset)
}

pub fn shift_interval(shift: &Shift, now: NaiveTime) -> (i32, i32) {
    interval_minutes(shift.start_time, shift.end_time, now)
}

pub fn compute_geometry(
    start: NaiveTime,
    end: Option<NaiveTime>,
    now: NaiveTime,
    scale: &GridScale,
) -> Geometry {
    let (start_offset, end_offset) = interval_minutes(start, end, now);
    let grid_origin = (scale.first_hour * 60) as i32;

    Geometry {
        top: (start_offset - grid_origin) as f32 / 60.0 * scale.pixels_per_hour,
        height: (end_offset - start_offset) as f32 / 60.0 * scale.pixels_per_hour,
    }
}

pub fn shift_geometry(shift: &Shift, now: NaiveTime, scale: &GridScale) -> Geometry {
    compute_geometry(shift.start_time, shift.end_time, now, scale)
}

/// Geometry straight from "HH:MM[:SS]" strings. Anything unparsable gives
/// `Geometry::INVALID` rather than an error.
///
/// The app validates records into `Shift` at the API boundary and calls
/// `shift_geometry`; this is the entry point for untyped callers.
#[allow(dead_code)]
pub fn geometry_from_strings(
    start: &str,
    end: Option<&str>,
    now: NaiveTime,
    scale: &GridScale,
) -> Geometry {
    let Ok(start) = parse_clock_time(start) else {
        return Geometry::INVALID;
    };
    let end = match end {
        Some(raw) => match parse_clock_time(raw) {
            Ok(end) => Some(end),
            Err(_) => return Geometry::INVALID,
        },
        None => None,
    };
    compute_geometry(start, end, now, scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn scale() -> GridScale {
        GridScale::default()
    }

    #[test]
    fn same_day_height_is_duration_in_minutes() {
        let noon = t(12, 0);
        for (start, end) in [((1, 0), (2, 0)), ((9, 15), (17, 45)), ((0, 0), (23, 59)), ((6, 30), (6, 30))] {
            let g = compute_geometry(t(start.0, start.1), Some(t(end.0, end.1)), noon, &scale());
            let start_min = (start.0 * 60 + start.1) as f32;
            let end_min = (end.0 * 60 + end.1) as f32;
            assert_eq!(g.height, end_min - start_min);
            assert_eq!(g.top, start_min - 60.0);
        }
    }

    #[test]
    fn closed_shift_crossing_midnight_rolls_over() {
        let g = geometry_from_strings("23:00:00", Some("01:00:00"), t(12, 0), &scale());
        assert_eq!(g.height, 120.0);
        assert_eq!(g.top, 22.0 * 60.0);
    }

    #[test]
    fn open_shift_runs_until_now() {
        let g = geometry_from_strings("09:00:00", None, t(10, 30), &scale());
        assert_eq!(g.height, 90.0);
        assert_eq!(g.top, 480.0);
    }

    #[test]
    fn open_shift_before_start_clamps_to_end_of_day() {
        let g = geometry_from_strings("09:00:00", None, t(8, 0), &scale());
        assert_eq!(g.height, (END_OF_DAY_MINUTES - 540) as f32);
    }

    #[test]
    fn open_shift_ignores_seconds_of_now() {
        let now = NaiveTime::from_hms_opt(9, 10, 59).unwrap();
        let g = geometry_from_strings("09:00", None, now, &scale());
        assert_eq!(g.height, 10.0);
    }

    #[test]
    fn closed_geometry_does_not_depend_on_now() {
        let a = geometry_from_strings("08:00:00", Some("16:30:00"), t(3, 0), &scale());
        let b = geometry_from_strings("08:00:00", Some("16:30:00"), t(21, 45), &scale());
        assert_eq!(a, b);
    }

    #[test]
    fn shift_before_first_hour_sits_above_grid() {
        let g = geometry_from_strings("00:30", Some("02:00"), t(12, 0), &scale());
        assert_eq!(g.top, -30.0);
        assert_eq!(g.height, 90.0);
    }

    #[test]
    fn malformed_input_is_invalid_geometry() {
        assert!(!geometry_from_strings("nine", None, t(12, 0), &scale()).is_valid());
        assert!(!geometry_from_strings("09", Some("10:00"), t(12, 0), &scale()).is_valid());
        assert!(!geometry_from_strings("09:00", Some("x"), t(12, 0), &scale()).is_valid());
        assert!(geometry_from_strings("09:00", Some("10:00"), t(12, 0), &scale()).is_valid());
    }

    #[test]
    fn scale_is_applied() {
        let half = GridScale {
            pixels_per_hour: 30.0,
            first_hour: 0,
        };
        let g = geometry_from_strings("02:00", Some("04:00"), t(12, 0), &half);
        assert_eq!(g.top, 60.0);
        assert_eq!(g.height, 60.0);
        assert_eq!(half.minutes_at(45.0), 90);
        assert_eq!(scale().grid_height(), 23.0 * 60.0);
    }
}
