//! Parsing and formatting of user-facing clock times and week boundaries

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Timelike};
use tracing::debug;

use crate::config::ClockFormat;

/// Parse a user-entered time ("9:00am", "14:30", "2pm", "9") to a time of day
pub fn parse_clock_input(input: &str) -> Option<NaiveTime> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    // Check for am/pm suffix
    let (time_part, meridiem) = if let Some(rest) = input.strip_suffix("pm") {
        (rest, Some(true))
    } else if let Some(rest) = input.strip_suffix("am") {
        (rest, Some(false))
    } else if let Some(rest) = input.strip_suffix('p') {
        (rest, Some(true))
    } else if let Some(rest) = input.strip_suffix('a') {
        (rest, Some(false))
    } else {
        (input.as_str(), None) // 24-hour format assumed
    };

    let time_part = time_part.trim();

    // Parse hour and minute; a valid seconds part is accepted and dropped
    let (hour, minute) = if time_part.contains(':') {
        let parts: Vec<&str> = time_part.split(':').collect();
        if parts.len() > 3 {
            return None;
        }
        let h = parts[0].parse::<u32>().ok()?;
        let m = parts[1].parse::<u32>().ok()?;
        if let Some(seconds) = parts.get(2) {
            if seconds.parse::<u32>().ok()? >= 60 {
                return None;
            }
        }
        (h, m)
    } else {
        (time_part.parse::<u32>().ok()?, 0)
    };

    let hour_24 = match meridiem {
        Some(_) if hour == 0 || hour > 12 => return None,
        Some(true) if hour < 12 => hour + 12,
        Some(false) if hour == 12 => 0, // 12am = midnight
        _ => hour,
    };

    let parsed = NaiveTime::from_hms_opt(hour_24, minute, 0);
    debug!(input = %input, parsed = ?parsed, "parsed clock input");
    parsed
}

/// Format a time of day according to the user's clock preference
pub fn format_clock_time(time: NaiveTime, clock_format: ClockFormat) -> String {
    match clock_format {
        ClockFormat::Hour24 => time.format("%H:%M").to_string(),
        ClockFormat::Hour12 => {
            let hour = time.hour();
            let (h12, ampm) = if hour == 0 {
                (12, "am")
            } else if hour < 12 {
                (hour, "am")
            } else if hour == 12 {
                (12, "pm")
            } else {
                (hour - 12, "pm")
            };
            format!("{}:{:02}{}", h12, time.minute(), ampm)
        }
    }
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Round minutes of day down to a quarter hour and turn them into a time.
/// Values past midnight are clamped to 23:45.
pub fn snap_to_quarter(minutes: i32) -> NaiveTime {
    let snapped = (minutes.clamp(0, 24 * 60 - 1) / 15) * 15;
    NaiveTime::from_hms_opt((snapped / 60) as u32, (snapped % 60) as u32, 0)
        .unwrap_or(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn parses_common_inputs() {
        assert_eq!(parse_clock_input("9"), Some(t(9, 0)));
        assert_eq!(parse_clock_input("14:30"), Some(t(14, 30)));
        assert_eq!(parse_clock_input("14:30:00"), Some(t(14, 30)));
        assert_eq!(parse_clock_input("2pm"), Some(t(14, 0)));
        assert_eq!(parse_clock_input(" 9:15AM "), Some(t(9, 15)));
        assert_eq!(parse_clock_input("12am"), Some(t(0, 0)));
        assert_eq!(parse_clock_input("12pm"), Some(t(12, 0)));
        assert_eq!(parse_clock_input("7p"), Some(t(19, 0)));
    }

    #[test]
    fn rejects_nonsense() {
        for bad in ["", "25", "10:75", "13pm", "0am", "noon", "9:xx"] {
            assert_eq!(parse_clock_input(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn seconds_must_be_real_seconds() {
        assert_eq!(parse_clock_input("9:30:59"), Some(t(9, 30)));
        for bad in ["9:30:zz", "9:30:00:00", "9:30:60", "9:30:", "9:"] {
            assert_eq!(parse_clock_input(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn formats_both_clocks() {
        assert_eq!(format_clock_time(t(14, 5), ClockFormat::Hour24), "14:05");
        assert_eq!(format_clock_time(t(14, 5), ClockFormat::Hour12), "2:05pm");
        assert_eq!(format_clock_time(t(0, 30), ClockFormat::Hour12), "12:30am");
        assert_eq!(format_clock_time(t(12, 0), ClockFormat::Hour12), "12:00pm");
    }

    #[test]
    fn week_starts_on_monday() {
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(week_start(sunday), monday);
        assert_eq!(week_start(monday), monday);
    }

    #[test]
    fn snapping_rounds_down_to_quarters() {
        assert_eq!(snap_to_quarter(9 * 60 + 14), t(9, 0));
        assert_eq!(snap_to_quarter(9 * 60 + 15), t(9, 15));
        assert_eq!(snap_to_quarter(24 * 60 + 30), t(23, 45));
        assert_eq!(snap_to_quarter(-5), t(0, 0));
    }
}
