//! # lms-db
//!
//! libSQL storage layer for the LMS.
//!
//! Holds every relational table: accounts, course content (courses, modules,
//! lessons, assessments, questions), learner state (enrollments, lesson
//! progress, attempts, certificates), groups and course access, the activity
//! log, and server-side sessions.
//!
//! `LmsDb` owns the database and its single connection; `LmsService` hosts the
//! per-entity repository methods in `repos/`.

pub mod error;
pub mod helpers;
pub mod inputs;
mod migrations;
pub mod repos;
pub mod service;
pub mod session_store;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

pub use service::LmsService;
pub use session_store::LibSqlSessionStore;

/// Central database handle.
///
/// Wraps a libSQL database and connection.
pub struct LmsDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl LmsDb {
    /// Open a local database at the given path. `":memory:"` opens an
    /// in-memory database.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let lms_db = Self { db, conn };
        lms_db.run_migrations().await?;
        tracing::debug!(path, "database opened");
        Ok(lms_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
