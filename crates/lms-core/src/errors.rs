//! Cross-cutting error types for the LMS.
//!
//! Domain-specific errors (`DatabaseError`, `AuthError`, ...) live in their
//! own crates. They converge into `ApiError` in `lms-server`.

use thiserror::Error;

/// Errors that can be raised by any LMS crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: i64 },

    /// A status transition was attempted that is not allowed.
    #[error("Invalid status transition for {entity_type} {id}: {from} -> {to}")]
    InvalidTransition {
        entity_type: String,
        id: i64,
        from: String,
        to: String,
    },

    /// Data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
