use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Classification of a placed calendar record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Project,
    Internal,
    TimeOff,
    Travel,
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

/// Provenance of an entry. `External` entries are mirrored from a foreign
/// calendar and are read-only through this core; the store controller
/// refuses update/delete for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    #[default]
    Local,
    External,
}

/// One placed unit of work or absence on the shared calendar.
///
/// All timestamps are naive local wall-clock values; the store does not
/// carry timezone information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: String,
    #[serde(rename = "memberId")]
    pub member_id: String,
    #[serde(rename = "projectId", default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "startInstant")]
    pub start: NaiveDateTime,
    #[serde(rename = "endInstant")]
    pub end: NaiveDateTime,
    #[serde(rename = "allDay")]
    pub all_day: bool,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub status: EntryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub source: EntrySource,
    /// Stable foreign-event identifier for synced entries; `None` for local ones.
    #[serde(rename = "externalRef", default, skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
}

impl ScheduleEntry {
    /// Effective time span of the entry. All-day entries cover 00:00-24:00 of
    /// every date in their range regardless of stored clock components.
    pub fn effective_span(&self) -> (NaiveDateTime, NaiveDateTime) {
        if self.all_day {
            let first = self.start.date().and_time(NaiveTime::MIN);
            let last = self.end.date().and_time(NaiveTime::MIN) + Duration::days(1);
            (first, last)
        } else {
            (self.start, self.end)
        }
    }

    /// Whether the entry's effective span touches the given calendar date.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        let (start, end) = self.effective_span();
        let day_start = date.and_time(NaiveTime::MIN);
        let day_end = day_start + Duration::days(1);
        start < day_end && end > day_start
    }

    pub fn is_external(&self) -> bool {
        self.source == EntrySource::External
    }
}

/// Roster entry consumed (not owned) by the scheduling core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub color: String,
    pub active: bool,
    #[serde(rename = "acceptedInvitation")]
    pub accepted_invitation: bool,
}

impl TeamMember {
    /// Only active members who accepted their invitation participate in
    /// scheduling and utilization.
    pub fn is_schedulable(&self) -> bool {
        self.active && self.accepted_invitation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOffCategory {
    Vacation,
    Sick,
    Parental,
    Other,
}

impl TimeOffCategory {
    /// Display title used when an approved request materializes an entry.
    pub fn entry_title(&self) -> &'static str {
        match self {
            TimeOffCategory::Vacation => "Vacation",
            TimeOffCategory::Sick => "Sick leave",
            TimeOffCategory::Parental => "Parental leave",
            TimeOffCategory::Other => "Time off",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOffStatus {
    Pending,
    Approved,
    Rejected,
}

/// A leave request. Terminal once approved or rejected; not re-openable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeOffRequest {
    pub id: String,
    #[serde(rename = "memberId")]
    pub member_id: String,
    /// Inclusive date range.
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    pub category: TimeOffCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub status: TimeOffStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOffDecision {
    Approve,
    Reject,
}

/// Payload for `createEntry`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateEntryRequest {
    #[serde(rename = "memberId")]
    pub member_id: String,
    #[serde(rename = "projectId", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "startInstant")]
    pub start: NaiveDateTime,
    #[serde(rename = "endInstant")]
    pub end: NaiveDateTime,
    #[serde(rename = "allDay")]
    pub all_day: bool,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub source: EntrySource,
    #[serde(rename = "externalRef", skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<String>,
}

/// Partial update for `updateEntry`; only the populated fields change.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntryPatch {
    #[serde(rename = "memberId", skip_serializing_if = "Option::is_none")]
    pub member_id: Option<String>,
    #[serde(rename = "projectId", skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "startInstant", skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDateTime>,
    #[serde(rename = "endInstant", skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDateTime>,
    #[serde(rename = "allDay", skip_serializing_if = "Option::is_none")]
    pub all_day: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntryStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl EntryPatch {
    pub fn is_empty(&self) -> bool {
        self.member_id.is_none()
            && self.project_id.is_none()
            && self.title.is_none()
            && self.description.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.all_day.is_none()
            && self.status.is_none()
            && self.color.is_none()
    }
}

/// Payload for `submitTimeOff`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitTimeOffRequest {
    #[serde(rename = "memberId")]
    pub member_id: String,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    pub category: TimeOffCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// One event from the foreign calendar feed. The collaborator that supplies
/// the feed has already resolved which roster member each event belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEvent {
    /// Stable identifier in the foreign calendar, used for reconciliation.
    pub id: String,
    #[serde(rename = "memberId")]
    pub member_id: String,
    pub title: String,
    #[serde(rename = "startInstant")]
    pub start: NaiveDateTime,
    #[serde(rename = "endInstant")]
    pub end: NaiveDateTime,
    #[serde(rename = "allDay", default)]
    pub all_day: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncStatus {
    pub connected: bool,
    #[serde(rename = "lastSyncAt", default)]
    pub last_sync_at: Option<NaiveDateTime>,
    #[serde(rename = "lastError", default)]
    pub last_error: Option<String>,
}

/// Counts reported by one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSummary {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

// Response envelopes used by the HTTP store.

#[derive(Debug, Clone, Deserialize)]
pub struct EntryListResponse {
    pub entries: Vec<ScheduleEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterResponse {
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimeOffListResponse {
    pub requests: Vec<TimeOffRequest>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceEventListResponse {
    pub events: Vec<SourceEvent>,
}
