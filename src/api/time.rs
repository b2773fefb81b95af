//! Wall-clock parsing and formatting helpers for the edit context.
//!
//! All values are naive local times; the scheduling core never converts
//! timezones.

use chrono::{NaiveTime, Timelike};

use crate::config::TimeFormat;

/// Parse a user-entered clock string (e.g. "9:00am", "14:30", "2pm") into a
/// local time. Bare values without an am/pm suffix are read as 24-hour.
pub fn parse_clock_time(input: &str) -> Option<NaiveTime> {
    let input = input.trim().to_lowercase();
    if input.is_empty() {
        return None;
    }

    // Check for am/pm suffix
    let (time_part, is_pm, has_suffix) = if input.ends_with("pm") {
        (&input[..input.len() - 2], true, true)
    } else if input.ends_with("am") {
        (&input[..input.len() - 2], false, true)
    } else if input.ends_with('p') {
        (&input[..input.len() - 1], true, true)
    } else if input.ends_with('a') {
        (&input[..input.len() - 1], false, true)
    } else {
        (input.as_str(), false, false)
    };

    let time_part = time_part.trim();

    let (hour, minute) = if time_part.contains(':') {
        let parts: Vec<&str> = time_part.split(':').collect();
        let h = parts[0].parse::<u32>().ok()?;
        let m = parts.get(1).and_then(|s| s.parse::<u32>().ok()).unwrap_or(0);
        (h, m)
    } else {
        let h = time_part.parse::<u32>().ok()?;
        (h, 0)
    };

    // Convert to 24-hour if a suffix was given
    let hour_24 = if is_pm && hour < 12 {
        hour + 12
    } else if !is_pm && has_suffix && hour == 12 {
        0 // 12am = midnight
    } else {
        hour
    };

    NaiveTime::from_hms_opt(hour_24, minute, 0)
}

/// Minutes since midnight.
pub fn minutes_of_day(time: NaiveTime) -> i64 {
    time.hour() as i64 * 60 + time.minute() as i64
}

/// Format decimal hours as "Xh Ym" string
pub fn format_hours(hours: f64) -> String {
    let total_minutes = (hours * 60.0).round() as i64;
    let h = total_minutes / 60;
    let m = total_minutes % 60;

    if h > 0 && m > 0 {
        format!("{}h {}m", h, m)
    } else if h > 0 {
        format!("{}h", h)
    } else if m > 0 {
        format!("{}m", m)
    } else {
        "0m".to_string()
    }
}

/// Format decimal hours based on the user's preferred time format
pub fn format_hours_with_format(hours: f64, time_format: TimeFormat) -> String {
    match time_format {
        TimeFormat::HoursMinutes => format_hours(hours),
        TimeFormat::Decimal => {
            if hours == 0.0 {
                "0h".to_string()
            } else if hours == hours.floor() {
                format!("{}h", hours as i64)
            } else {
                // Format with 2 decimals, then trim trailing zeros
                let s = format!("{:.2}", hours);
                let trimmed = s.trim_end_matches('0').trim_end_matches('.');
                format!("{}h", trimmed)
            }
        }
    }
}
