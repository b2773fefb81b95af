//! Grid geometry for the calendar views.
//!
//! Day and week render on a proportional hour grid; month renders as an
//! overflow-aware listing per day cell. Both treat externally synced entries
//! like local ones for space, but flag them non-interactive.

use chrono::NaiveDate;

use super::window::DateWindow;
use crate::api::{minutes_of_day, EntryKind, ScheduleEntry, TeamMember};

/// Pixel height of one hour row in the day/week grid.
pub const HOUR_HEIGHT: f32 = 60.0;
/// Very short entries are stretched to stay legible and clickable.
pub const MIN_BLOCK_HEIGHT: f32 = 20.0;
/// Fixed height of the all-day lane above the hourly grid.
pub const ALL_DAY_LANE_HEIGHT: f32 = 28.0;
/// Fixed color for time-off and externally synced entries.
pub const NEUTRAL_COLOR: &str = "#94a3b8";

/// Resolve the display color of an entry: explicit override, then the owning
/// member's color. Time-off and external entries always use the neutral
/// color.
pub fn entry_display_color(entry: &ScheduleEntry, roster: &[TeamMember]) -> String {
    if matches!(entry.kind, EntryKind::TimeOff | EntryKind::External) {
        return NEUTRAL_COLOR.to_string();
    }
    if let Some(color) = &entry.color {
        return color.clone();
    }
    roster
        .iter()
        .find(|m| m.id == entry.member_id)
        .map(|m| m.color.clone())
        .unwrap_or_else(|| NEUTRAL_COLOR.to_string())
}

/// Geometry of one timed entry on the proportional grid.
#[derive(Debug, Clone)]
pub struct TimedBlock<'a> {
    pub entry: &'a ScheduleEntry,
    /// Pixels from the top of the visible grid.
    pub top: f32,
    pub height: f32,
    /// False for externally synced entries.
    pub interactive: bool,
    pub color: String,
}

/// One chip in the all-day lane; chips stack one row per entry.
#[derive(Debug, Clone)]
pub struct AllDayChip<'a> {
    pub entry: &'a ScheduleEntry,
    pub row: usize,
    pub interactive: bool,
    pub color: String,
}

/// Layout of a single day column in the day/week grid.
#[derive(Debug, Clone)]
pub struct DayColumn<'a> {
    pub date: NaiveDate,
    pub all_day: Vec<AllDayChip<'a>>,
    pub blocks: Vec<TimedBlock<'a>>,
}

/// Place one timed entry on the grid for its date, clamped to the visible
/// hour range. Entries entirely outside the range produce no block.
pub fn layout_timed<'a>(
    entry: &'a ScheduleEntry,
    visible_hours: (u8, u8),
    roster: &[TeamMember],
) -> Option<TimedBlock<'a>> {
    let range_start = visible_hours.0 as i64 * 60;
    let range_end = visible_hours.1 as i64 * 60;

    let entry_start = minutes_of_day(entry.start.time());
    // Entries running past midnight fill the rest of their start date.
    let entry_end = if entry.end.date() > entry.start.date() {
        24 * 60
    } else {
        minutes_of_day(entry.end.time())
    };

    if entry_end <= range_start || entry_start >= range_end {
        return None;
    }

    let clamped_start = entry_start.max(range_start);
    let clamped_end = entry_end.min(range_end);

    let top = (clamped_start - range_start) as f32 / 60.0 * HOUR_HEIGHT;
    let height = ((clamped_end - clamped_start) as f32 / 60.0 * HOUR_HEIGHT).max(MIN_BLOCK_HEIGHT);

    Some(TimedBlock {
        entry,
        top,
        height,
        interactive: !entry.is_external(),
        color: entry_display_color(entry, roster),
    })
}

/// Lay out one date's column: all-day chips stacked above, timed blocks on
/// the proportional grid below.
pub fn layout_day_column<'a>(
    entries: &'a [ScheduleEntry],
    roster: &[TeamMember],
    date: NaiveDate,
    visible_hours: (u8, u8),
) -> DayColumn<'a> {
    let mut all_day: Vec<&ScheduleEntry> = entries
        .iter()
        .filter(|e| e.all_day && e.occurs_on(date))
        .collect();
    all_day.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));

    let chips = all_day
        .into_iter()
        .enumerate()
        .map(|(row, entry)| AllDayChip {
            entry,
            row,
            interactive: !entry.is_external(),
            color: entry_display_color(entry, roster),
        })
        .collect();

    let mut timed: Vec<&ScheduleEntry> = entries
        .iter()
        .filter(|e| !e.all_day && e.start.date() == date)
        .collect();
    timed.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.title.cmp(&b.title)));

    let blocks = timed
        .into_iter()
        .filter_map(|entry| layout_timed(entry, visible_hours, roster))
        .collect();

    DayColumn {
        date,
        all_day: chips,
        blocks,
    }
}

/// One cell of the month listing grid.
#[derive(Debug, Clone)]
pub struct MonthCell<'a> {
    pub date: NaiveDate,
    pub outside_focus: bool,
    /// Entries listed in the cell: all-day first, then timed by start time
    /// with ties broken by title.
    pub visible: Vec<&'a ScheduleEntry>,
    /// Count hidden behind the "+K more" indicator; zero when all fit.
    pub overflow: usize,
}

/// Build the month grid cells. Each cell lists at most `max_entries` and
/// reports the overflow count. Activating a cell is a drill-down to the day
/// view (the controller's `drill_into_day`), not an inline expansion.
pub fn layout_month_cells<'a>(
    window: &DateWindow,
    entries: &'a [ScheduleEntry],
    max_entries: usize,
) -> Vec<MonthCell<'a>> {
    window
        .days
        .iter()
        .map(|day| {
            let mut cell_entries: Vec<&ScheduleEntry> =
                entries.iter().filter(|e| e.occurs_on(day.date)).collect();
            cell_entries.sort_by(|a, b| {
                b.all_day
                    .cmp(&a.all_day)
                    .then_with(|| a.start.time().cmp(&b.start.time()))
                    .then_with(|| a.title.cmp(&b.title))
            });

            let total = cell_entries.len();
            let overflow = total.saturating_sub(max_entries);
            cell_entries.truncate(max_entries);

            MonthCell {
                date: day.date,
                outside_focus: day.outside_focus,
                visible: cell_entries,
                overflow,
            }
        })
        .collect()
}
