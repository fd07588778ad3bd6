//! `tower-sessions` store backed by the `tower_sessions` table.
//!
//! Records are stored as JSON with the expiry as a unix timestamp, so expired
//! rows can be filtered on load and purged in bulk.

use std::fmt;

use async_trait::async_trait;
use time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, ExpiredDeletion, SessionStore};

#[derive(Clone)]
pub struct LibSqlSessionStore {
    conn: libsql::Connection,
}

impl fmt::Debug for LibSqlSessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LibSqlSessionStore").finish_non_exhaustive()
    }
}

fn backend(e: libsql::Error) -> session_store::Error {
    session_store::Error::Backend(e.to_string())
}

impl LibSqlSessionStore {
    #[must_use]
    pub const fn new(conn: libsql::Connection) -> Self {
        Self { conn }
    }

    fn encode(record: &Record) -> session_store::Result<String> {
        serde_json::to_string(record).map_err(|e| session_store::Error::Encode(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for LibSqlSessionStore {
    /// Insert a new record, drawing fresh ids until one is unused.
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        loop {
            let inserted = self
                .conn
                .execute(
                    "INSERT INTO tower_sessions (id, data, expiry_date) VALUES (?1, ?2, ?3)
                     ON CONFLICT (id) DO NOTHING",
                    libsql::params![
                        record.id.to_string(),
                        Self::encode(record)?,
                        record.expiry_date.unix_timestamp()
                    ],
                )
                .await
                .map_err(backend)?;
            if inserted > 0 {
                return Ok(());
            }
            record.id = Id::default();
        }
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.conn
            .execute(
                "INSERT INTO tower_sessions (id, data, expiry_date) VALUES (?1, ?2, ?3)
                 ON CONFLICT (id) DO UPDATE SET
                     data = excluded.data,
                     expiry_date = excluded.expiry_date",
                libsql::params![
                    record.id.to_string(),
                    Self::encode(record)?,
                    record.expiry_date.unix_timestamp()
                ],
            )
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let mut rows = self
            .conn
            .query(
                "SELECT data FROM tower_sessions WHERE id = ?1 AND expiry_date > ?2",
                libsql::params![
                    session_id.to_string(),
                    OffsetDateTime::now_utc().unix_timestamp()
                ],
            )
            .await
            .map_err(backend)?;
        let Some(row) = rows.next().await.map_err(backend)? else {
            return Ok(None);
        };
        let data = row.get::<String>(0).map_err(backend)?;
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|e| session_store::Error::Decode(e.to_string()))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.conn
            .execute(
                "DELETE FROM tower_sessions WHERE id = ?1",
                [session_id.to_string()],
            )
            .await
            .map_err(backend)?;
        Ok(())
    }
}

#[async_trait]
impl ExpiredDeletion for LibSqlSessionStore {
    async fn delete_expired(&self) -> session_store::Result<()> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM tower_sessions WHERE expiry_date <= ?1",
                [OffsetDateTime::now_utc().unix_timestamp()],
            )
            .await
            .map_err(backend)?;
        tracing::debug!(removed, "expired sessions deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::test_support::helpers::test_service;
    use pretty_assertions::assert_eq;
    use time::Duration;

    fn record(expires_in: Duration) -> Record {
        let mut data = HashMap::new();
        data.insert("user_id".to_string(), serde_json::json!(7));
        Record {
            id: Id::default(),
            data,
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn save_load_delete() {
        let svc = test_service().await;
        let store = svc.session_store();
        let mut rec = record(Duration::hours(1));

        store.create(&mut rec).await.unwrap();
        let loaded = store.load(&rec.id).await.unwrap().unwrap();
        assert_eq!(loaded.data, rec.data);

        rec.data.insert("flash".into(), serde_json::json!("hi"));
        store.save(&rec).await.unwrap();
        let loaded = store.load(&rec.id).await.unwrap().unwrap();
        assert_eq!(loaded.data.len(), 2);

        store.delete(&rec.id).await.unwrap();
        assert!(store.load(&rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_records_are_invisible_and_purged() {
        let svc = test_service().await;
        let store = svc.session_store();
        let mut stale = record(Duration::seconds(-5));
        let mut fresh = record(Duration::hours(1));
        store.create(&mut stale).await.unwrap();
        store.create(&mut fresh).await.unwrap();

        assert!(store.load(&stale.id).await.unwrap().is_none());

        store.delete_expired().await.unwrap();
        let remaining = svc
            .count("SELECT COUNT(*) FROM tower_sessions", ())
            .await
            .unwrap();
        assert_eq!(remaining, 1);
    }
}
