//! Database models for persistent storage.

mod activity;
mod definition;

pub use activity::*;
pub use definition::*;

use chrono::{DateTime, Utc};

/// Stored timestamps are unix milliseconds.
pub(crate) fn to_millis(at: &DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

pub(crate) fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}
