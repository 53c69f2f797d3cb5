//! Error types for laurel-engine

use thiserror::Error;

/// Engine error type
///
/// `Query` and `Transaction` are recoverable: the pipeline logs them and
/// moves on to the next definition.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Query failed: {0}")]
    Query(String),

    #[error("Unlock transaction failed: {0}")]
    Transaction(#[source] laurel_db::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<laurel_core::Error> for Error {
    fn from(err: laurel_core::Error) -> Self {
        Error::Query(err.to_string())
    }
}
