//! Capacity-usage aggregation.
//!
//! Computes per-member, per-day booked hours and utilization percentages
//! over a window, plus member and team averages.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::window::DateWindow;
use crate::api::{EntryKind, EntryStatus, ScheduleEntry, TeamMember};

/// One member-day of the utilization report. The time-off and weekend flags
/// are informational; the numeric hours are computed independently of them.
#[derive(Debug, Clone, PartialEq)]
pub struct DayUtilization {
    pub date: NaiveDate,
    /// Booked hours, uncapped; overtime is visible here.
    pub hours: f64,
    /// Booked hours as a share of capacity, capped at 100.
    pub utilization_percent: f64,
    pub is_time_off: bool,
    pub is_weekend: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberUtilization {
    pub member_id: String,
    pub days: Vec<DayUtilization>,
    /// Average utilization over the window's non-weekend days.
    pub average_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UtilizationReport {
    pub members: Vec<MemberUtilization>,
    /// Unweighted arithmetic mean of the member averages.
    pub team_average_percent: f64,
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Hours one entry contributes to the given member-day. All-day entries
/// count as a full day of capacity; timed entries count their real span.
fn booked_hours(entry: &ScheduleEntry, date: NaiveDate, capacity_hours_per_day: f64) -> f64 {
    if entry.status == EntryStatus::Cancelled || entry.kind == EntryKind::External {
        return 0.0;
    }
    if entry.all_day {
        if entry.occurs_on(date) {
            capacity_hours_per_day
        } else {
            0.0
        }
    } else if entry.start.date() == date {
        let span: Duration = entry.end - entry.start;
        span.num_minutes() as f64 / 60.0
    } else {
        0.0
    }
}

/// Aggregate booked hours over the window's focus days (month-grid padding
/// days are excluded from the math even though they render). Only active
/// members who accepted their invitation are reported.
pub fn aggregate(
    entries: &[ScheduleEntry],
    roster: &[TeamMember],
    window: &DateWindow,
    capacity_hours_per_day: f64,
) -> UtilizationReport {
    let focus_days: Vec<NaiveDate> = window.focus_days().collect();

    let members: Vec<MemberUtilization> = roster
        .iter()
        .filter(|m| m.is_schedulable())
        .map(|member| {
            let member_entries: Vec<&ScheduleEntry> = entries
                .iter()
                .filter(|e| e.member_id == member.id)
                .collect();

            let days: Vec<DayUtilization> = focus_days
                .iter()
                .map(|&date| {
                    let hours: f64 = member_entries
                        .iter()
                        .map(|e| booked_hours(e, date, capacity_hours_per_day))
                        .sum();

                    let utilization_percent = if capacity_hours_per_day > 0.0 {
                        (hours / capacity_hours_per_day * 100.0).min(100.0)
                    } else {
                        0.0
                    };

                    let is_time_off = member_entries.iter().any(|e| {
                        e.kind == EntryKind::TimeOff
                            && e.status != EntryStatus::Cancelled
                            && e.occurs_on(date)
                    });

                    DayUtilization {
                        date,
                        hours,
                        utilization_percent,
                        is_time_off,
                        is_weekend: is_weekend(date),
                    }
                })
                .collect();

            // Weekend days are excluded from both numerator and denominator.
            let workdays: Vec<&DayUtilization> =
                days.iter().filter(|d| !d.is_weekend).collect();
            let average_percent = if workdays.is_empty() || capacity_hours_per_day <= 0.0 {
                0.0
            } else {
                let booked: f64 = workdays.iter().map(|d| d.hours).sum();
                booked / (workdays.len() as f64 * capacity_hours_per_day) * 100.0
            };

            MemberUtilization {
                member_id: member.id.clone(),
                days,
                average_percent,
            }
        })
        .collect();

    let team_average_percent = if members.is_empty() {
        0.0
    } else {
        members.iter().map(|m| m.average_percent).sum::<f64>() / members.len() as f64
    };

    UtilizationReport {
        members,
        team_average_percent,
    }
}
