//! Error types for esprelay-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown {kind} id: {id}")]
    UnknownId { kind: &'static str, id: u8 },

    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    #[error("Invalid value for {kind} {id}: {detail}")]
    InvalidValue {
        kind: &'static str,
        id: u8,
        detail: String,
    },

    #[error("Malformed state object: {0}")]
    MalformedState(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
