//! Double-booking detection over the current entry set.
//!
//! Pure function of the entry set and a candidate placement; it carries no
//! state between calls, so the caller can re-run it on every draft edit.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::api::ScheduleEntry;

/// Half-open interval overlap. Touching boundaries (one range ends exactly
/// when the other starts) do not overlap.
pub fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Find all entries the candidate placement would double-book against.
///
/// All-day candidates never conflict; multiple absences and placeholders may
/// coexist on the same day. Candidates are compared only against timed local
/// entries of the same member, skipping `exclude_entry_id` so an entry being
/// edited is not reported against itself. Returns the full conflicting list
/// (empty means no conflict, not an error).
pub fn detect_conflicts<'a>(
    entries: &'a [ScheduleEntry],
    member_id: &str,
    date: NaiveDate,
    start: NaiveTime,
    end: NaiveTime,
    all_day: bool,
    exclude_entry_id: Option<&str>,
) -> Vec<&'a ScheduleEntry> {
    if all_day {
        return Vec::new();
    }

    let candidate_start = date.and_time(start);
    let candidate_end = date.and_time(end);

    entries
        .iter()
        .filter(|entry| {
            entry.member_id == member_id
                && !entry.all_day
                && !entry.is_external()
                && exclude_entry_id != Some(entry.id.as_str())
                && overlaps(entry.start, entry.end, candidate_start, candidate_end)
        })
        .collect()
}
