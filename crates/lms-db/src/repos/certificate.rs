//! Certificate repository. One certificate per user and course.

use chrono::Utc;

use lms_core::entities::Certificate;

use crate::error::DatabaseError;
use crate::helpers::{collect_rows, get_opt_string, parse_datetime};
use crate::service::LmsService;

const SELECT_COLS: &str = "id, user_id, course_id, issue_date, certificate_url";

fn row_to_certificate(row: &libsql::Row) -> Result<Certificate, DatabaseError> {
    Ok(Certificate {
        id: row.get(0)?,
        user_id: row.get(1)?,
        course_id: row.get(2)?,
        issue_date: parse_datetime(&row.get::<String>(3)?)?,
        certificate_url: get_opt_string(row, 4)?,
    })
}

impl LmsService {
    /// Issue a certificate, or return the one already issued for this
    /// user and course.
    pub async fn issue_certificate(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Certificate, DatabaseError> {
        let inserted = self
            .db()
            .conn()
            .execute(
                "INSERT INTO certificates (user_id, course_id, issue_date) VALUES (?1, ?2, ?3)
                 ON CONFLICT (user_id, course_id) DO NOTHING",
                libsql::params![user_id, course_id, Utc::now().to_rfc3339()],
            )
            .await?;
        if inserted > 0 {
            tracing::info!(user_id, course_id, "certificate issued");
        }

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM certificates WHERE user_id = ?1 AND course_id = ?2"
                ),
                libsql::params![user_id, course_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_certificate(&row)
    }

    pub async fn get_certificate(&self, id: i64) -> Result<Certificate, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM certificates WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_certificate(&row)
    }

    pub async fn list_certificates_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<Certificate>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM certificates WHERE user_id = ?1 ORDER BY issue_date DESC, id DESC"
                ),
                [user_id],
            )
            .await?;
        collect_rows(rows, row_to_certificate).await
    }

    pub async fn list_certificates(&self) -> Result<Vec<Certificate>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM certificates ORDER BY issue_date DESC, id DESC"),
                (),
            )
            .await?;
        collect_rows(rows, row_to_certificate).await
    }
}
