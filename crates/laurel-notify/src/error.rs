//! Error types for laurel-notify

use thiserror::Error;

/// Notification error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed notification payload: missing {field}")]
    MalformedPayload { field: &'static str },

    #[error("Notification scheduler has shut down")]
    SchedulerClosed,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
