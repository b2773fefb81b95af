//! Schedule store controller.
//!
//! Sole owner of the window, roster, entry set, and time-off requests. All
//! mutation commands go through the store boundary and follow
//! confirm-then-refetch: after any accepted mutation the affected window is
//! reloaded instead of patching local state, so the conflict detector and
//! utilization aggregator always see what the store holds. The backing store
//! is authoritative and last-write-wins; there is no optimistic-concurrency
//! token.

use chrono::{Local, NaiveDate, NaiveTime};
use tracing::{info, warn};

use crate::api::{
    ApiError, CreateEntryRequest, EntryKind, EntryPatch, ReconcileSummary, ScheduleBackend,
    ScheduleEntry, SourceEvent, SubmitTimeOffRequest, SyncStatus, TeamMember, TimeOffCategory,
    TimeOffDecision, TimeOffRequest, TimeOffStatus,
};
use crate::config::Config;
use crate::error::StoreError;
use crate::schedule::{
    conflict, layout, sync, time_off, utilization, window, DateWindow, DayColumn, Granularity,
    MonthCell, UtilizationReport,
};

/// Editable candidate fields for one entry placement. Exactly one draft is
/// open at a time; opening another discards this one (no autosave).
#[derive(Debug, Clone)]
pub struct EntryDraft {
    /// `Some` while editing an existing entry, `None` for a new placement.
    pub entry_id: Option<String>,
    pub member_id: String,
    pub project_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub all_day: bool,
    pub kind: EntryKind,
    pub color: Option<String>,
}

pub struct ScheduleStore<B> {
    backend: B,
    config: Config,
    window: DateWindow,
    roster: Vec<TeamMember>,
    selected_member_ids: Option<Vec<String>>,
    entries: Vec<ScheduleEntry>,
    time_off_requests: Vec<TimeOffRequest>,
    sync_status: Option<SyncStatus>,
    edit_context: Option<EntryDraft>,
    pending_delete: Option<String>,
}

impl<B: ScheduleBackend> ScheduleStore<B> {
    pub fn new(backend: B, config: Config) -> Self {
        let today = Local::now().date_naive();
        Self {
            backend,
            config,
            window: DateWindow::new(Granularity::Week, today),
            roster: Vec::new(),
            selected_member_ids: None,
            entries: Vec::new(),
            time_off_requests: Vec::new(),
            sync_status: None,
            edit_context: None,
            pending_delete: None,
        }
    }

    /// Load roster, entries, requests, and sync state for the initial window.
    pub async fn initialize(&mut self) -> Result<(), StoreError> {
        self.roster = self.backend.list_roster().await?;
        self.refresh().await?;
        self.refresh_time_off().await?;
        self.sync_status = self.backend.get_sync_status().await.ok();
        Ok(())
    }

    /// Refetch the entry set for the current window.
    pub async fn refresh(&mut self) -> Result<(), StoreError> {
        let mut entries = self
            .backend
            .list_entries(
                self.window.start,
                self.window.end,
                self.selected_member_ids.as_deref(),
            )
            .await?;
        entries.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.title.cmp(&b.title)));
        self.entries = entries;
        Ok(())
    }

    pub async fn refresh_time_off(&mut self) -> Result<(), StoreError> {
        self.time_off_requests = self.backend.list_time_off_requests(None).await?;
        Ok(())
    }

    // --- window navigation -------------------------------------------------

    pub async fn load_window(
        &mut self,
        granularity: Granularity,
        anchor: NaiveDate,
    ) -> Result<(), StoreError> {
        self.window = DateWindow::new(granularity, anchor);
        self.refresh().await
    }

    pub async fn go_next(&mut self) -> Result<(), StoreError> {
        self.window = self.window.next();
        self.refresh().await
    }

    pub async fn go_prev(&mut self) -> Result<(), StoreError> {
        self.window = self.window.prev();
        self.refresh().await
    }

    pub async fn go_today(&mut self) -> Result<(), StoreError> {
        self.window = self.window.today();
        self.refresh().await
    }

    /// Switch granularity; the anchor stays put.
    pub async fn set_granularity(&mut self, granularity: Granularity) -> Result<(), StoreError> {
        self.window = self.window.with_granularity(granularity);
        self.refresh().await
    }

    /// Month-cell drill-down: jump to the day view anchored on that date.
    pub async fn drill_into_day(&mut self, date: NaiveDate) -> Result<(), StoreError> {
        self.load_window(Granularity::Day, date).await
    }

    pub async fn select_members(
        &mut self,
        member_ids: Option<Vec<String>>,
    ) -> Result<(), StoreError> {
        self.selected_member_ids = member_ids;
        self.refresh().await
    }

    // --- accessors and derived views ---------------------------------------

    pub fn window(&self) -> &DateWindow {
        &self.window
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn roster(&self) -> &[TeamMember] {
        &self.roster
    }

    pub fn schedulable_roster(&self) -> Vec<&TeamMember> {
        self.roster.iter().filter(|m| m.is_schedulable()).collect()
    }

    pub fn time_off_requests(&self) -> &[TimeOffRequest] {
        &self.time_off_requests
    }

    pub fn sync_status(&self) -> Option<&SyncStatus> {
        self.sync_status.as_ref()
    }

    /// Whether the day/week grid should render weekend columns.
    pub fn show_weekends(&self) -> bool {
        window::should_show_weekends(&self.entries)
    }

    /// Day columns for the proportional day/week grid.
    pub fn day_columns(&self) -> Vec<DayColumn<'_>> {
        let visible = self.config.visible_hours();
        self.window
            .days
            .iter()
            .map(|day| layout::layout_day_column(&self.entries, &self.roster, day.date, visible))
            .collect()
    }

    /// Month listing cells with overflow counts.
    pub fn month_cells(&self) -> Vec<MonthCell<'_>> {
        layout::layout_month_cells(&self.window, &self.entries, self.config.month_cell_max_entries)
    }

    pub fn utilization_report(&self) -> UtilizationReport {
        utilization::aggregate(
            &self.entries,
            &self.roster,
            &self.window,
            self.config.capacity_hours_per_day,
        )
    }

    // --- edit context ------------------------------------------------------

    /// Open a draft for a new placement, discarding any unsaved edits.
    pub fn open_add(&mut self, member_id: &str, date: NaiveDate) -> &EntryDraft {
        self.edit_context.insert(EntryDraft {
            entry_id: None,
            member_id: member_id.to_string(),
            project_id: None,
            title: String::new(),
            description: None,
            date,
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN),
            all_day: false,
            kind: EntryKind::Project,
            color: None,
        })
    }

    /// Open a draft over an existing local entry, discarding any unsaved
    /// edits. Externally synced entries are refused here, at the mutation
    /// boundary, not merely in the presentation layer.
    pub fn open_edit(&mut self, entry_id: &str) -> Result<&EntryDraft, StoreError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.id == entry_id)
            .ok_or(StoreError::NotFound)?;
        if entry.is_external() {
            return Err(StoreError::ImmutableEntry {
                entry_id: entry_id.to_string(),
            });
        }

        let draft = EntryDraft {
            entry_id: Some(entry.id.clone()),
            member_id: entry.member_id.clone(),
            project_id: entry.project_id.clone(),
            title: entry.title.clone(),
            description: entry.description.clone(),
            date: entry.start.date(),
            start: entry.start.time(),
            end: entry.end.time(),
            all_day: entry.all_day,
            kind: entry.kind,
            color: entry.color.clone(),
        };
        Ok(self.edit_context.insert(draft))
    }

    pub fn draft(&self) -> Option<&EntryDraft> {
        self.edit_context.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut EntryDraft> {
        self.edit_context.as_mut()
    }

    pub fn discard_edit(&mut self) {
        self.edit_context = None;
    }

    /// Advisory pre-submit conflict check for the open draft. A non-empty
    /// result is a warning, never an error; saving proceeds once the user
    /// confirms, and the store may still accept it.
    pub fn draft_conflicts(&self) -> Vec<&ScheduleEntry> {
        match &self.edit_context {
            Some(draft) => conflict::detect_conflicts(
                &self.entries,
                &draft.member_id,
                draft.date,
                draft.start,
                draft.end,
                draft.all_day,
                draft.entry_id.as_deref(),
            ),
            None => Vec::new(),
        }
    }

    fn validate_draft(draft: &EntryDraft) -> Result<(), StoreError> {
        if draft.title.trim().is_empty() {
            return Err(StoreError::Validation { field: "title" });
        }
        if draft.member_id.trim().is_empty() {
            return Err(StoreError::Validation { field: "member" });
        }
        if !draft.all_day && draft.end < draft.start {
            return Err(StoreError::Validation { field: "time range" });
        }
        Ok(())
    }

    /// Send the open draft to the store and refetch the window. Validation
    /// failures are caught before any network call.
    pub async fn save_draft(&mut self) -> Result<ScheduleEntry, StoreError> {
        let draft = self
            .edit_context
            .clone()
            .ok_or(StoreError::Validation { field: "draft" })?;
        Self::validate_draft(&draft)?;

        let result = match &draft.entry_id {
            Some(entry_id) => {
                // Guard the mutation boundary again: the entry may have been
                // replaced by a synced mirror since the draft was opened.
                if let Some(entry) = self.entries.iter().find(|e| e.id == *entry_id) {
                    if entry.is_external() {
                        return Err(StoreError::ImmutableEntry {
                            entry_id: entry_id.clone(),
                        });
                    }
                }
                let patch = EntryPatch {
                    member_id: Some(draft.member_id.clone()),
                    project_id: draft.project_id.clone(),
                    title: Some(draft.title.clone()),
                    description: draft.description.clone(),
                    start: Some(draft.date.and_time(draft.start)),
                    end: Some(draft.date.and_time(draft.end)),
                    all_day: Some(draft.all_day),
                    status: None,
                    color: draft.color.clone(),
                };
                self.backend.update_entry(entry_id, &patch).await
            }
            None => {
                let request = CreateEntryRequest {
                    member_id: draft.member_id.clone(),
                    project_id: draft.project_id.clone(),
                    title: draft.title.clone(),
                    description: draft.description.clone(),
                    start: draft.date.and_time(draft.start),
                    end: draft.date.and_time(draft.end),
                    all_day: draft.all_day,
                    kind: draft.kind,
                    color: draft.color.clone(),
                    source: Default::default(),
                    external_ref: None,
                };
                self.backend.create_entry(&request).await
            }
        };

        let saved = self.recover(result).await?;
        self.edit_context = None;
        self.refresh().await?;
        Ok(saved)
    }

    // --- deletion ----------------------------------------------------------

    /// First step of deletion: mark the entry pending confirmation. There is
    /// no undo, so the destructive call only happens in `confirm_delete`.
    pub fn request_delete(&mut self, entry_id: &str) -> Result<(), StoreError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.id == entry_id)
            .ok_or(StoreError::NotFound)?;
        if entry.is_external() {
            return Err(StoreError::ImmutableEntry {
                entry_id: entry_id.to_string(),
            });
        }
        self.pending_delete = Some(entry_id.to_string());
        Ok(())
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Second step of deletion. A confirm with nothing pending is a no-op.
    pub async fn confirm_delete(&mut self) -> Result<(), StoreError> {
        let Some(entry_id) = self.pending_delete.take() else {
            return Ok(());
        };
        let result = self.backend.delete_entry(&entry_id).await;
        self.recover(result).await?;
        self.refresh().await
    }

    // --- time off ----------------------------------------------------------

    pub async fn submit_time_off(
        &mut self,
        member_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        category: TimeOffCategory,
        note: Option<String>,
    ) -> Result<TimeOffRequest, StoreError> {
        let draft = SubmitTimeOffRequest {
            member_id: member_id.to_string(),
            start_date,
            end_date,
            category,
            note,
        };
        time_off::validate_submission(&draft)?;
        let request = self.backend.submit_time_off(&draft).await?;
        self.refresh_time_off().await?;
        Ok(request)
    }

    /// Decide a pending request. Approval materializes exactly one all-day
    /// time-off entry for the requester's date range; rejection creates
    /// nothing. Role restrictions are enforced by the auth collaborator.
    pub async fn decide_time_off(
        &mut self,
        request_id: &str,
        decision: TimeOffDecision,
    ) -> Result<TimeOffRequest, StoreError> {
        let request = self
            .time_off_requests
            .iter()
            .find(|r| r.id == request_id)
            .ok_or(StoreError::NotFound)?;
        time_off::ensure_pending(request)?;

        let result = self.backend.decide_time_off(request_id, decision).await;
        let decided = self.recover(result).await?;

        if decided.status == TimeOffStatus::Approved {
            let entry = time_off::materialize(&decided);
            self.backend.create_entry(&entry).await?;
            info!(
                request_id,
                member_id = %decided.member_id,
                "time-off approved, blocking entry placed"
            );
            self.refresh().await?;
        }
        self.refresh_time_off().await?;
        Ok(decided)
    }

    // --- external sync -----------------------------------------------------

    /// Run one import reconciliation against the foreign calendar feed for
    /// the current window, then refetch. Idempotent for an unchanged feed.
    pub async fn trigger_sync(&mut self) -> Result<ReconcileSummary, StoreError> {
        if !self.config.sync_policy.imports() {
            info!("sync policy is export-only, skipping import reconciliation");
            return Ok(ReconcileSummary::default());
        }

        let events: Vec<SourceEvent> = self
            .backend
            .fetch_source_events(self.window.start, self.window.end)
            .await?;
        let plan = sync::plan_reconcile(&self.entries, &events);
        let summary = plan.summary();

        for request in &plan.create {
            self.backend.create_entry(request).await?;
        }
        for (entry_id, patch) in &plan.update {
            self.backend.update_entry(entry_id, patch).await?;
        }
        // Reconciliation is the one path allowed to remove external mirrors.
        for entry_id in &plan.remove {
            self.backend.delete_entry(entry_id).await?;
        }

        info!(
            created = summary.created,
            updated = summary.updated,
            removed = summary.removed,
            "calendar reconciliation applied"
        );

        self.refresh().await?;
        self.sync_status = self.backend.get_sync_status().await.ok();
        Ok(summary)
    }

    // --- error recovery ----------------------------------------------------

    /// Map a store failure per policy: a concurrent deletion refetches the
    /// window rather than retrying the stale mutation; anything else is
    /// surfaced untouched for the user to re-issue.
    async fn recover<T>(&mut self, result: Result<T, ApiError>) -> Result<T, StoreError> {
        match result {
            Ok(value) => Ok(value),
            Err(ApiError::NotFound) => {
                warn!("entity vanished from the store, refetching window");
                self.refresh().await?;
                Err(StoreError::NotFound)
            }
            Err(other) => Err(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{EntrySource, EntryStatus};
    use std::sync::Mutex;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[derive(Default)]
    struct BackendState {
        entries: Vec<ScheduleEntry>,
        roster: Vec<TeamMember>,
        requests: Vec<TimeOffRequest>,
        source_events: Vec<SourceEvent>,
        next_id: u32,
        decide_calls: u32,
    }

    /// In-memory stand-in for the remote store.
    #[derive(Default)]
    struct InMemoryBackend {
        state: Mutex<BackendState>,
    }

    impl InMemoryBackend {
        fn with_state(f: impl FnOnce(&mut BackendState)) -> Self {
            let backend = Self::default();
            f(&mut backend.state.lock().unwrap());
            backend
        }
    }

    #[async_trait::async_trait]
    impl ScheduleBackend for InMemoryBackend {
        async fn list_entries(
            &self,
            window_start: NaiveDate,
            window_end: NaiveDate,
            member_ids: Option<&[String]>,
        ) -> Result<Vec<ScheduleEntry>, ApiError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .entries
                .iter()
                .filter(|e| {
                    e.start.date() <= window_end
                        && e.end.date() >= window_start
                        && member_ids
                            .map(|ids| ids.contains(&e.member_id))
                            .unwrap_or(true)
                })
                .cloned()
                .collect())
        }

        async fn create_entry(
            &self,
            draft: &CreateEntryRequest,
        ) -> Result<ScheduleEntry, ApiError> {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let entry = ScheduleEntry {
                id: format!("e{}", state.next_id),
                member_id: draft.member_id.clone(),
                project_id: draft.project_id.clone(),
                title: draft.title.clone(),
                description: draft.description.clone(),
                start: draft.start,
                end: draft.end,
                all_day: draft.all_day,
                kind: draft.kind,
                status: EntryStatus::Scheduled,
                color: draft.color.clone(),
                source: draft.source,
                external_ref: draft.external_ref.clone(),
            };
            state.entries.push(entry.clone());
            Ok(entry)
        }

        async fn update_entry(
            &self,
            entry_id: &str,
            patch: &EntryPatch,
        ) -> Result<ScheduleEntry, ApiError> {
            let mut state = self.state.lock().unwrap();
            let entry = state
                .entries
                .iter_mut()
                .find(|e| e.id == entry_id)
                .ok_or(ApiError::NotFound)?;
            if let Some(member_id) = &patch.member_id {
                entry.member_id = member_id.clone();
            }
            if let Some(title) = &patch.title {
                entry.title = title.clone();
            }
            if let Some(start) = patch.start {
                entry.start = start;
            }
            if let Some(end) = patch.end {
                entry.end = end;
            }
            if let Some(all_day) = patch.all_day {
                entry.all_day = all_day;
            }
            if let Some(status) = patch.status {
                entry.status = status;
            }
            Ok(entry.clone())
        }

        async fn delete_entry(&self, entry_id: &str) -> Result<(), ApiError> {
            let mut state = self.state.lock().unwrap();
            let before = state.entries.len();
            state.entries.retain(|e| e.id != entry_id);
            if state.entries.len() == before {
                return Err(ApiError::NotFound);
            }
            Ok(())
        }

        async fn list_roster(&self) -> Result<Vec<TeamMember>, ApiError> {
            Ok(self.state.lock().unwrap().roster.clone())
        }

        async fn list_time_off_requests(
            &self,
            status: Option<TimeOffStatus>,
        ) -> Result<Vec<TimeOffRequest>, ApiError> {
            let state = self.state.lock().unwrap();
            Ok(state
                .requests
                .iter()
                .filter(|r| status.map(|s| r.status == s).unwrap_or(true))
                .cloned()
                .collect())
        }

        async fn submit_time_off(
            &self,
            draft: &SubmitTimeOffRequest,
        ) -> Result<TimeOffRequest, ApiError> {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let request = TimeOffRequest {
                id: format!("r{}", state.next_id),
                member_id: draft.member_id.clone(),
                start_date: draft.start_date,
                end_date: draft.end_date,
                category: draft.category,
                note: draft.note.clone(),
                status: TimeOffStatus::Pending,
            };
            state.requests.push(request.clone());
            Ok(request)
        }

        async fn decide_time_off(
            &self,
            request_id: &str,
            decision: TimeOffDecision,
        ) -> Result<TimeOffRequest, ApiError> {
            let mut state = self.state.lock().unwrap();
            state.decide_calls += 1;
            let request = state
                .requests
                .iter_mut()
                .find(|r| r.id == request_id)
                .ok_or(ApiError::NotFound)?;
            request.status = match decision {
                TimeOffDecision::Approve => TimeOffStatus::Approved,
                TimeOffDecision::Reject => TimeOffStatus::Rejected,
            };
            Ok(request.clone())
        }

        async fn get_sync_status(&self) -> Result<SyncStatus, ApiError> {
            Ok(SyncStatus {
                connected: true,
                last_sync_at: None,
                last_error: None,
            })
        }

        async fn fetch_source_events(
            &self,
            _window_start: NaiveDate,
            _window_end: NaiveDate,
        ) -> Result<Vec<SourceEvent>, ApiError> {
            Ok(self.state.lock().unwrap().source_events.clone())
        }
    }

    fn member(id: &str) -> TeamMember {
        TeamMember {
            id: id.into(),
            name: id.into(),
            color: "#1398f4".into(),
            active: true,
            accepted_invitation: true,
        }
    }

    fn seeded_entry(id: &str, member: &str, d: NaiveDate, from: (u32, u32), to: (u32, u32)) -> ScheduleEntry {
        ScheduleEntry {
            id: id.into(),
            member_id: member.into(),
            project_id: None,
            title: "Site visit".into(),
            description: None,
            start: d.and_time(time(from.0, from.1)),
            end: d.and_time(time(to.0, to.1)),
            all_day: false,
            kind: EntryKind::Project,
            status: EntryStatus::Scheduled,
            color: None,
            source: EntrySource::Local,
            external_ref: None,
        }
    }

    async fn store_on_week(backend: InMemoryBackend) -> ScheduleStore<InMemoryBackend> {
        let mut store = ScheduleStore::new(backend, Config::default());
        store.initialize().await.unwrap();
        store
            .load_window(Granularity::Week, date(5))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn saving_a_draft_creates_and_refetches() {
        let backend = InMemoryBackend::with_state(|s| s.roster = vec![member("m1")]);
        let mut store = store_on_week(backend).await;

        store.open_add("m1", date(3));
        {
            let draft = store.draft_mut().unwrap();
            draft.title = "Boiler swap".into();
            draft.start = time(9, 0);
            draft.end = time(12, 0);
        }
        let saved = store.save_draft().await.unwrap();
        assert_eq!(saved.title, "Boiler swap");
        assert!(store.draft().is_none());
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.entries()[0].id, saved.id);
    }

    #[tokio::test]
    async fn empty_title_fails_before_any_network_call() {
        let backend = InMemoryBackend::with_state(|s| s.roster = vec![member("m1")]);
        let mut store = store_on_week(backend).await;

        store.open_add("m1", date(3));
        let err = store.save_draft().await.unwrap_err();
        assert!(matches!(err, StoreError::Validation { field: "title" }));
        assert!(store.entries().is_empty());
    }

    #[tokio::test]
    async fn draft_conflicts_warn_but_never_block_the_save() {
        let backend = InMemoryBackend::with_state(|s| {
            s.roster = vec![member("m1")];
            s.entries = vec![seeded_entry("e1", "m1", date(3), (9, 0), (12, 0))];
        });
        let mut store = store_on_week(backend).await;

        store.open_add("m1", date(3));
        {
            let draft = store.draft_mut().unwrap();
            draft.title = "Overlap".into();
            draft.start = time(11, 0);
            draft.end = time(13, 0);
        }
        let conflicts = store.draft_conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].id, "e1");

        // User confirms; the save still goes through.
        store.save_draft().await.unwrap();
        assert_eq!(store.entries().len(), 2);
    }

    #[tokio::test]
    async fn external_entries_are_immutable_through_the_controller() {
        let backend = InMemoryBackend::with_state(|s| {
            s.roster = vec![member("m1")];
            let mut mirror = seeded_entry("e1", "m1", date(3), (9, 0), (10, 0));
            mirror.source = EntrySource::External;
            mirror.kind = EntryKind::External;
            mirror.external_ref = Some("g1".into());
            s.entries = vec![mirror];
        });
        let mut store = store_on_week(backend).await;

        assert!(matches!(
            store.open_edit("e1"),
            Err(StoreError::ImmutableEntry { .. })
        ));
        assert!(matches!(
            store.request_delete("e1"),
            Err(StoreError::ImmutableEntry { .. })
        ));
        assert_eq!(store.entries().len(), 1);
    }

    #[tokio::test]
    async fn deletion_requires_the_confirmation_step() {
        let backend = InMemoryBackend::with_state(|s| {
            s.roster = vec![member("m1")];
            s.entries = vec![seeded_entry("e1", "m1", date(3), (9, 0), (10, 0))];
        });
        let mut store = store_on_week(backend).await;

        store.request_delete("e1").unwrap();
        assert_eq!(store.pending_delete(), Some("e1"));
        // Still present until confirmed.
        assert_eq!(store.entries().len(), 1);

        store.confirm_delete().await.unwrap();
        assert!(store.entries().is_empty());
        assert!(store.pending_delete().is_none());
    }

    #[tokio::test]
    async fn approval_materializes_exactly_one_time_off_entry() {
        let backend = InMemoryBackend::with_state(|s| {
            s.roster = vec![member("m1")];
            s.requests = vec![TimeOffRequest {
                id: "r1".into(),
                member_id: "m1".into(),
                start_date: date(3),
                end_date: date(7),
                category: TimeOffCategory::Vacation,
                note: None,
                status: TimeOffStatus::Pending,
            }];
        });
        let mut store = store_on_week(backend).await;
        store.refresh_time_off().await.unwrap();

        let decided = store
            .decide_time_off("r1", TimeOffDecision::Approve)
            .await
            .unwrap();
        assert_eq!(decided.status, TimeOffStatus::Approved);

        let blocking: Vec<&ScheduleEntry> = store
            .entries()
            .iter()
            .filter(|e| e.kind == EntryKind::TimeOff)
            .collect();
        assert_eq!(blocking.len(), 1);
        assert_eq!(blocking[0].member_id, "m1");
        assert!(blocking[0].all_day);
        assert_eq!(blocking[0].start.date(), date(3));
        assert_eq!(blocking[0].end.date(), date(7));
    }

    #[tokio::test]
    async fn rejection_creates_no_entry() {
        let backend = InMemoryBackend::with_state(|s| {
            s.roster = vec![member("m1")];
            s.requests = vec![TimeOffRequest {
                id: "r1".into(),
                member_id: "m1".into(),
                start_date: date(3),
                end_date: date(4),
                category: TimeOffCategory::Sick,
                note: None,
                status: TimeOffStatus::Pending,
            }];
        });
        let mut store = store_on_week(backend).await;
        store.refresh_time_off().await.unwrap();

        let decided = store
            .decide_time_off("r1", TimeOffDecision::Reject)
            .await
            .unwrap();
        assert_eq!(decided.status, TimeOffStatus::Rejected);
        assert!(store.entries().is_empty());
    }

    #[tokio::test]
    async fn decided_requests_fail_locally_without_a_store_call() {
        let backend = InMemoryBackend::with_state(|s| {
            s.roster = vec![member("m1")];
            s.requests = vec![TimeOffRequest {
                id: "r1".into(),
                member_id: "m1".into(),
                start_date: date(3),
                end_date: date(4),
                category: TimeOffCategory::Other,
                note: None,
                status: TimeOffStatus::Rejected,
            }];
        });
        let mut store = store_on_week(backend).await;
        store.refresh_time_off().await.unwrap();

        let err = store
            .decide_time_off("r1", TimeOffDecision::Approve)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidStateTransition { .. }));
        assert_eq!(store.backend.state.lock().unwrap().decide_calls, 0);
    }

    #[tokio::test]
    async fn sync_is_idempotent_for_an_unchanged_feed() {
        let backend = InMemoryBackend::with_state(|s| {
            s.roster = vec![member("m1")];
            s.source_events = vec![
                SourceEvent {
                    id: "g1".into(),
                    member_id: "m1".into(),
                    title: "Dentist".into(),
                    start: date(3).and_time(time(9, 0)),
                    end: date(3).and_time(time(10, 0)),
                    all_day: false,
                },
                SourceEvent {
                    id: "g2".into(),
                    member_id: "m1".into(),
                    title: "Inspection".into(),
                    start: date(4).and_time(time(13, 0)),
                    end: date(4).and_time(time(15, 0)),
                    all_day: false,
                },
            ];
        });
        let mut store = store_on_week(backend).await;

        let first = store.trigger_sync().await.unwrap();
        assert_eq!(first.created, 2);
        assert_eq!(store.entries().len(), 2);

        let second = store.trigger_sync().await.unwrap();
        assert_eq!(second, ReconcileSummary::default());
        assert_eq!(store.entries().len(), 2);
    }

    #[tokio::test]
    async fn sync_removes_mirrors_deleted_upstream() {
        let backend = InMemoryBackend::with_state(|s| {
            s.roster = vec![member("m1")];
            s.source_events = vec![SourceEvent {
                id: "g1".into(),
                member_id: "m1".into(),
                title: "Dentist".into(),
                start: date(3).and_time(time(9, 0)),
                end: date(3).and_time(time(10, 0)),
                all_day: false,
            }];
        });
        let mut store = store_on_week(backend).await;
        store.trigger_sync().await.unwrap();
        assert_eq!(store.entries().len(), 1);

        store.backend.state.lock().unwrap().source_events.clear();
        let summary = store.trigger_sync().await.unwrap();
        assert_eq!(summary.removed, 1);
        assert!(store.entries().is_empty());
    }

    #[tokio::test]
    async fn export_only_policy_skips_import_reconciliation() {
        let backend = InMemoryBackend::with_state(|s| {
            s.roster = vec![member("m1")];
            s.source_events = vec![SourceEvent {
                id: "g1".into(),
                member_id: "m1".into(),
                title: "Dentist".into(),
                start: date(3).and_time(time(9, 0)),
                end: date(3).and_time(time(10, 0)),
                all_day: false,
            }];
        });
        let config = Config {
            sync_policy: crate::config::SyncPolicy::ExportOnly,
            ..Config::default()
        };
        let mut store = ScheduleStore::new(backend, config);
        store.initialize().await.unwrap();
        store.load_window(Granularity::Week, date(5)).await.unwrap();

        let summary = store.trigger_sync().await.unwrap();
        assert_eq!(summary, ReconcileSummary::default());
        assert!(store.entries().is_empty());
    }

    #[tokio::test]
    async fn concurrent_deletion_refetches_instead_of_retrying() {
        let backend = InMemoryBackend::with_state(|s| {
            s.roster = vec![member("m1")];
            s.entries = vec![seeded_entry("e1", "m1", date(3), (9, 0), (10, 0))];
        });
        let mut store = store_on_week(backend).await;
        store.open_edit("e1").unwrap();
        {
            let draft = store.draft_mut().unwrap();
            draft.title = "Renamed".into();
        }

        // Another actor deletes the entry out from under the edit.
        store.backend.state.lock().unwrap().entries.clear();

        let err = store.save_draft().await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound));
        // The window was refetched, so the stale entry is gone locally too.
        assert!(store.entries().is_empty());
    }

    #[tokio::test]
    async fn opening_a_new_context_discards_unsaved_edits() {
        let backend = InMemoryBackend::with_state(|s| {
            s.roster = vec![member("m1")];
            s.entries = vec![seeded_entry("e1", "m1", date(3), (9, 0), (10, 0))];
        });
        let mut store = store_on_week(backend).await;

        store.open_edit("e1").unwrap();
        store.draft_mut().unwrap().title = "Half-finished edit".into();

        // Moving focus to a new placement drops the previous draft.
        let draft = store.open_add("m1", date(4));
        assert!(draft.entry_id.is_none());
        assert!(draft.title.is_empty());
    }

    #[tokio::test]
    async fn derived_views_reflect_the_current_window() {
        let backend = InMemoryBackend::with_state(|s| {
            s.roster = vec![member("m1")];
            s.entries = vec![seeded_entry("e1", "m1", date(3), (9, 0), (12, 0))];
        });
        let mut store = store_on_week(backend).await;

        let columns = store.day_columns();
        assert_eq!(columns.len(), 7);
        let monday = columns.iter().find(|c| c.date == date(3)).unwrap();
        assert_eq!(monday.blocks.len(), 1);

        let report = store.utilization_report();
        assert_eq!(report.members.len(), 1);
        assert_eq!(report.members[0].days[0].hours, 3.0);

        store
            .set_granularity(Granularity::Month)
            .await
            .unwrap();
        let cells = store.month_cells();
        assert_eq!(cells.len() % 7, 0);
        let cell = cells.iter().find(|c| c.date == date(3)).unwrap();
        assert_eq!(cell.visible.len(), 1);
    }

    #[tokio::test]
    async fn member_filter_narrows_the_window() {
        let backend = InMemoryBackend::with_state(|s| {
            s.roster = vec![member("m1"), member("m2")];
            s.entries = vec![
                seeded_entry("e1", "m1", date(3), (9, 0), (10, 0)),
                seeded_entry("e2", "m2", date(3), (9, 0), (10, 0)),
            ];
        });
        let mut store = store_on_week(backend).await;
        assert_eq!(store.entries().len(), 2);

        store
            .select_members(Some(vec!["m1".to_string()]))
            .await
            .unwrap();
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.entries()[0].member_id, "m1");
    }
}
