mod client;
mod time;
mod types;

pub use client::{ApiError, ScheduleClient};
pub use time::{format_hours, format_hours_with_format, minutes_of_day, parse_clock_time};
pub use types::*;

use chrono::NaiveDate;

/// Command/query boundary to the scheduling store (§external collaborators).
///
/// Every suspension point in the core goes through this trait; the pure
/// calculators never await. The HTTP client implements it for production and
/// tests substitute an in-memory double.
#[async_trait::async_trait]
pub trait ScheduleBackend: Send + Sync {
    async fn list_entries(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
        member_ids: Option<&[String]>,
    ) -> Result<Vec<ScheduleEntry>, ApiError>;

    async fn create_entry(&self, draft: &CreateEntryRequest) -> Result<ScheduleEntry, ApiError>;

    async fn update_entry(
        &self,
        entry_id: &str,
        patch: &EntryPatch,
    ) -> Result<ScheduleEntry, ApiError>;

    async fn delete_entry(&self, entry_id: &str) -> Result<(), ApiError>;

    async fn list_roster(&self) -> Result<Vec<TeamMember>, ApiError>;

    async fn list_time_off_requests(
        &self,
        status: Option<TimeOffStatus>,
    ) -> Result<Vec<TimeOffRequest>, ApiError>;

    async fn submit_time_off(
        &self,
        draft: &SubmitTimeOffRequest,
    ) -> Result<TimeOffRequest, ApiError>;

    async fn decide_time_off(
        &self,
        request_id: &str,
        decision: TimeOffDecision,
    ) -> Result<TimeOffRequest, ApiError>;

    async fn get_sync_status(&self) -> Result<SyncStatus, ApiError>;

    /// The foreign calendar feed consumed by the import-side reconciliation.
    async fn fetch_source_events(
        &self,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<Vec<SourceEvent>, ApiError>;
}
