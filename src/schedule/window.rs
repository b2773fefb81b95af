//! Calendar windowing: bounds and day enumeration for the three view
//! granularities, plus unit-wise navigation.

use chrono::{Datelike, Duration, Local, Months, NaiveDate, Weekday};

use crate::api::ScheduleEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Day,
    Week,
    Month,
}

/// One renderable date of a window. `outside_focus` marks month-grid padding
/// days belonging to the adjacent months; they still carry real entries but
/// are excluded from utilization math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDay {
    pub date: NaiveDate,
    pub outside_focus: bool,
}

/// A resolved calendar window: inclusive date bounds plus the ordered list of
/// dates to render. Total over all valid dates; navigation never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    pub granularity: Granularity,
    pub anchor: NaiveDate,
    /// First date of the rendered grid (for month, the first padding day).
    pub start: NaiveDate,
    /// Last date of the rendered grid, inclusive.
    pub end: NaiveDate,
    pub days: Vec<WindowDay>,
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_from_monday = date.weekday().num_days_from_monday();
    date - Duration::days(days_from_monday as i64)
}

fn month_first(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn month_last(date: NaiveDate) -> NaiveDate {
    let first = month_first(date);
    first
        .checked_add_months(Months::new(1))
        .map(|next| next - Duration::days(1))
        .unwrap_or(first)
}

impl DateWindow {
    pub fn new(granularity: Granularity, anchor: NaiveDate) -> Self {
        match granularity {
            Granularity::Day => {
                let days = vec![WindowDay {
                    date: anchor,
                    outside_focus: false,
                }];
                Self {
                    granularity,
                    anchor,
                    start: anchor,
                    end: anchor,
                    days,
                }
            }
            Granularity::Week => {
                let start = week_start(anchor);
                let days = (0..7)
                    .map(|i| WindowDay {
                        date: start + Duration::days(i),
                        outside_focus: false,
                    })
                    .collect();
                Self {
                    granularity,
                    anchor,
                    start,
                    end: start + Duration::days(6),
                    days,
                }
            }
            Granularity::Month => {
                let focus_first = month_first(anchor);
                let focus_last = month_last(anchor);
                // Pad both ends to full Monday-start weeks so the grid is
                // always a multiple of 7 cells.
                let grid_start = week_start(focus_first);
                let grid_end = week_start(focus_last) + Duration::days(6);
                let mut days = Vec::new();
                let mut date = grid_start;
                while date <= grid_end {
                    days.push(WindowDay {
                        date,
                        outside_focus: date < focus_first || date > focus_last,
                    });
                    date += Duration::days(1);
                }
                Self {
                    granularity,
                    anchor,
                    start: grid_start,
                    end: grid_end,
                    days,
                }
            }
        }
    }

    /// Shift the anchor forward by one unit of the current granularity.
    pub fn next(&self) -> Self {
        Self::new(self.granularity, self.shifted_anchor(1))
    }

    /// Shift the anchor back by one unit of the current granularity.
    pub fn prev(&self) -> Self {
        Self::new(self.granularity, self.shifted_anchor(-1))
    }

    /// Reset the anchor to the current local date.
    pub fn today(&self) -> Self {
        Self::new(self.granularity, Local::now().date_naive())
    }

    /// Switch granularity without moving the anchor.
    pub fn with_granularity(&self, granularity: Granularity) -> Self {
        Self::new(granularity, self.anchor)
    }

    fn shifted_anchor(&self, steps: i64) -> NaiveDate {
        match self.granularity {
            Granularity::Day => self.anchor + Duration::days(steps),
            Granularity::Week => self.anchor + Duration::days(7 * steps),
            Granularity::Month => {
                let months = Months::new(steps.unsigned_abs() as u32);
                let shifted = if steps >= 0 {
                    self.anchor.checked_add_months(months)
                } else {
                    self.anchor.checked_sub_months(months)
                };
                shifted.unwrap_or(self.anchor)
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Dates that count toward utilization: everything except month padding.
    pub fn focus_days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days
            .iter()
            .filter(|d| !d.outside_focus)
            .map(|d| d.date)
    }
}

/// Whether weekends should be rendered: today falls on one, or any entry in
/// the window does.
pub fn should_show_weekends(entries: &[ScheduleEntry]) -> bool {
    let today = Local::now().date_naive();

    if matches!(today.weekday(), Weekday::Sat | Weekday::Sun) {
        return true;
    }

    entries.iter().any(|entry| {
        matches!(
            entry.start.date().weekday(),
            Weekday::Sat | Weekday::Sun
        ) || matches!(entry.end.date().weekday(), Weekday::Sat | Weekday::Sun)
    })
}
