//! Leave-request workflow rules.
//!
//! Requests move from pending to approved or rejected and never back; the
//! transition check runs locally before the decision command is sent, and an
//! approval materializes exactly one all-day blocking entry.

use chrono::NaiveTime;

use crate::api::{
    CreateEntryRequest, EntryKind, EntrySource, SubmitTimeOffRequest, TimeOffRequest,
    TimeOffStatus,
};
use crate::error::StoreError;

/// Reject a decision on a request that already left the pending state.
/// Decisions are neither idempotent nor reversible.
pub fn ensure_pending(request: &TimeOffRequest) -> Result<(), StoreError> {
    if request.status == TimeOffStatus::Pending {
        Ok(())
    } else {
        Err(StoreError::InvalidStateTransition {
            request_id: request.id.clone(),
            status: request.status,
        })
    }
}

/// Field checks on a submission, run before any network call.
pub fn validate_submission(draft: &SubmitTimeOffRequest) -> Result<(), StoreError> {
    if draft.member_id.trim().is_empty() {
        return Err(StoreError::Validation { field: "member" });
    }
    if draft.end_date < draft.start_date {
        return Err(StoreError::Validation { field: "date range" });
    }
    Ok(())
}

/// Build the single blocking entry an approved request materializes: all-day,
/// spanning the request's inclusive date range, owned by the requester.
pub fn materialize(request: &TimeOffRequest) -> CreateEntryRequest {
    CreateEntryRequest {
        member_id: request.member_id.clone(),
        project_id: None,
        title: request.category.entry_title().to_string(),
        description: request.note.clone(),
        start: request.start_date.and_time(NaiveTime::MIN),
        end: request.end_date.and_time(NaiveTime::MIN),
        all_day: true,
        kind: EntryKind::TimeOff,
        color: None,
        source: EntrySource::Local,
        external_ref: None,
    }
}
