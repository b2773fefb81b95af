use thiserror::Error;

use crate::api::{ApiError, TimeOffStatus};

/// Recoverable failures surfaced by the schedule store controller. The pure
/// calculators (window, conflict, layout, utilization) are total functions
/// and never produce these.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field is missing or malformed; caught before any network
    /// call and named so the caller can highlight the offending input.
    #[error("required field missing or invalid: {field}")]
    Validation { field: &'static str },

    /// Update or delete attempted on an entry mirrored from the external
    /// calendar.
    #[error("entry {entry_id} is synced from an external calendar and is read-only")]
    ImmutableEntry { entry_id: String },

    /// A time-off decision was attempted on a request that already left the
    /// pending state. Decisions are neither idempotent nor reversible.
    #[error("time-off request {request_id} has already been decided ({status:?})")]
    InvalidStateTransition {
        request_id: String,
        status: TimeOffStatus,
    },

    /// The target was mutated or deleted by another actor; the controller
    /// refetches the window instead of retrying the stale mutation.
    #[error("entity no longer exists on the store")]
    NotFound,

    /// Any other request failure. Surfaced as a notice; never retried
    /// automatically.
    #[error(transparent)]
    Transient(ApiError),
}

impl From<ApiError> for StoreError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotFound => StoreError::NotFound,
            other => StoreError::Transient(other),
        }
    }
}
