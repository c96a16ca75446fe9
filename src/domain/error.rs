//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent taxonomy defects and rejected user input.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("taxonomy has no root emotions")]
    EmptyTaxonomy,

    #[error("duplicate emotion id in taxonomy: {0}")]
    DuplicateNodeId(String),

    #[error("malformed taxonomy node {id:?}: {reason}")]
    MalformedNode { id: String, reason: String },

    #[error("invalid taxonomy document: {0}")]
    InvalidTaxonomy(String),

    #[error("intensity must be between {min} and {max}, got {value}")]
    IntensityOutOfRange { value: i64, min: u8, max: u8 },

    #[error("cannot apply {input} while {state}")]
    InvalidTransition {
        input: &'static str,
        state: &'static str,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
