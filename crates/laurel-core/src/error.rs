//! Error types for laurel-core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Fact lookup failed: {0}")]
    Facts(String),

    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
