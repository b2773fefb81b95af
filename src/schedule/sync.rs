//! Import-side reconciliation of the foreign calendar feed.
//!
//! Planning is pure: given the current entry set and the latest foreign
//! events, produce the creates, updates, and removals that bring the mirror
//! in line. Matching is by the stable foreign-event identifier, never by
//! content equality, so re-running against an unchanged feed yields an empty
//! plan. The controller applies the plan through the store boundary.

use std::collections::HashMap;

use crate::api::{
    CreateEntryRequest, EntryKind, EntryPatch, EntrySource, ReconcileSummary, ScheduleEntry,
    SourceEvent,
};

#[derive(Debug, Clone, Default)]
pub struct ReconcilePlan {
    pub create: Vec<CreateEntryRequest>,
    /// (local entry id, fields that drifted upstream)
    pub update: Vec<(String, EntryPatch)>,
    /// Local entry ids whose foreign event disappeared.
    pub remove: Vec<String>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.create.is_empty() && self.update.is_empty() && self.remove.is_empty()
    }

    pub fn summary(&self) -> ReconcileSummary {
        ReconcileSummary {
            created: self.create.len(),
            updated: self.update.len(),
            removed: self.remove.len(),
        }
    }
}

/// Map a foreign event onto a read-only schedule entry draft.
fn entry_from_source(event: &SourceEvent) -> CreateEntryRequest {
    CreateEntryRequest {
        member_id: event.member_id.clone(),
        project_id: None,
        title: event.title.clone(),
        description: None,
        start: event.start,
        end: event.end,
        all_day: event.all_day,
        kind: EntryKind::External,
        color: None,
        source: EntrySource::External,
        external_ref: Some(event.id.clone()),
    }
}

/// Fields that drifted between the mirrored entry and its foreign event.
fn drift_patch(entry: &ScheduleEntry, event: &SourceEvent) -> EntryPatch {
    let mut patch = EntryPatch::default();
    if entry.title != event.title {
        patch.title = Some(event.title.clone());
    }
    if entry.start != event.start {
        patch.start = Some(event.start);
    }
    if entry.end != event.end {
        patch.end = Some(event.end);
    }
    if entry.all_day != event.all_day {
        patch.all_day = Some(event.all_day);
    }
    if entry.member_id != event.member_id {
        patch.member_id = Some(event.member_id.clone());
    }
    patch
}

/// Compute the import reconciliation plan for the current window.
pub fn plan_reconcile(entries: &[ScheduleEntry], events: &[SourceEvent]) -> ReconcilePlan {
    let mirrored: HashMap<&str, &ScheduleEntry> = entries
        .iter()
        .filter(|e| e.source == EntrySource::External)
        .filter_map(|e| e.external_ref.as_deref().map(|r| (r, e)))
        .collect();

    let mut plan = ReconcilePlan::default();

    for event in events {
        match mirrored.get(event.id.as_str()) {
            None => plan.create.push(entry_from_source(event)),
            Some(entry) => {
                let patch = drift_patch(entry, event);
                if !patch.is_empty() {
                    plan.update.push((entry.id.clone(), patch));
                }
            }
        }
    }

    // Mirrors whose foreign event disappeared were deleted upstream.
    for (external_ref, entry) in &mirrored {
        if !events.iter().any(|e| e.id == *external_ref) {
            plan.remove.push(entry.id.clone());
        }
    }
    plan.remove.sort();

    plan
}
