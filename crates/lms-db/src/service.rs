//! Service layer hosting all repository methods.
//!
//! `LmsService` wraps `LmsDb`. Repository methods are implemented as
//! `impl LmsService` blocks, one module per entity under `repos/`. Mutations
//! that the activity log tracks (enrollment, lesson completion, attempts)
//! append their log row inside the same method.

use crate::LmsDb;
use crate::error::DatabaseError;
use crate::session_store::LibSqlSessionStore;

pub struct LmsService {
    db: LmsDb,
}

impl LmsService {
    /// Open a service over a local database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = LmsDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Create from an existing `LmsDb`.
    #[must_use]
    pub const fn from_db(db: LmsDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &LmsDb {
        &self.db
    }

    /// A session store sharing this service's connection.
    #[must_use]
    pub fn session_store(&self) -> LibSqlSessionStore {
        LibSqlSessionStore::new(self.db.conn().clone())
    }

    /// `SELECT COUNT(*)` style scalar query.
    pub(crate) async fn count(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<i64, DatabaseError> {
        let mut rows = self.db.conn().query(sql, params).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?)
    }

    /// Execute a `DELETE ... WHERE id = ?1`, mapping zero affected rows to
    /// `NoResult`.
    pub(crate) async fn delete_by_id(&self, table: &str, id: i64) -> Result<(), DatabaseError> {
        let affected = self
            .db
            .conn()
            .execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id])
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        tracing::debug!(table, id, "row deleted");
        Ok(())
    }
}
