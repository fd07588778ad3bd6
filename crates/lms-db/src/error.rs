//! Database error types for lms-db.

use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// A uniqueness rule was violated (duplicate email, enrollment, ...).
    #[error("{0}")]
    Conflict(String),

    /// Input rejected before reaching SQL.
    #[error("{0}")]
    Validation(String),

    /// Invalid state encountered (e.g., illegal status transition).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// Rewrite a UNIQUE constraint failure into `Conflict(message)`; other
    /// errors pass through unchanged.
    #[must_use]
    pub fn on_unique(self, message: &str) -> Self {
        if self.is_unique_violation() {
            Self::Conflict(message.to_string())
        } else {
            self
        }
    }

    /// Rewrite a FOREIGN KEY failure (reference to a missing row) into
    /// `Validation(message)`.
    #[must_use]
    pub fn on_foreign_key(self, message: &str) -> Self {
        match &self {
            Self::LibSql(e) if e.to_string().contains("FOREIGN KEY constraint failed") => {
                Self::Validation(message.to_string())
            }
            _ => self,
        }
    }

    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::LibSql(e) => e.to_string().contains("UNIQUE constraint failed"),
            Self::Conflict(_) => true,
            _ => false,
        }
    }
}
