//! Field-service team scheduling core.
//!
//! Places workers on a shared calendar, detects double-bookings, lays out the
//! day/week/month grids, reports capacity usage, mirrors a foreign calendar
//! read-only, and runs the time-off approval workflow. The store controller
//! owns all shared state and every network suspension point; the calculators
//! under [`schedule`] are pure and synchronous.

pub mod api;
pub mod config;
pub mod error;
pub mod report;
pub mod schedule;
pub mod store;

pub use error::StoreError;
pub use store::{EntryDraft, ScheduleStore};
