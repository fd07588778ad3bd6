//! Activity log: an append-only record of learner actions.

use chrono::Utc;

use lms_core::entities::ActivityLog;
use lms_core::enums::ActivityAction;

use crate::error::DatabaseError;
use crate::helpers::{collect_rows, get_opt_string, parse_datetime, parse_enum, parse_json, parse_optional_enum, to_json};
use crate::service::LmsService;

const SELECT_COLS: &str = "id, user_id, action, resource_type, resource_id, metadata, created_at";

fn row_to_activity(row: &libsql::Row) -> Result<ActivityLog, DatabaseError> {
    Ok(ActivityLog {
        id: row.get(0)?,
        user_id: row.get(1)?,
        action: parse_enum(&row.get::<String>(2)?)?,
        resource_type: parse_optional_enum(get_opt_string(row, 3)?.as_deref())?,
        resource_id: row.get::<Option<i64>>(4)?,
        metadata: parse_json(&row.get::<String>(5)?)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl LmsService {
    /// Append an activity row. The resource type follows from the action.
    pub async fn log_activity(
        &self,
        user_id: i64,
        action: ActivityAction,
        resource_id: i64,
        metadata: serde_json::Value,
    ) -> Result<ActivityLog, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "INSERT INTO activity_logs (user_id, action, resource_type, resource_id, metadata, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     RETURNING {SELECT_COLS}"
                ),
                libsql::params![
                    user_id,
                    action.as_str(),
                    action.resource_type().as_str(),
                    resource_id,
                    to_json(&metadata)?,
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let entry = row_to_activity(&row)?;
        tracing::debug!(user_id, action = %action, resource_id, "activity logged");
        Ok(entry)
    }

    /// Most recent activity for a user, newest first.
    pub async fn list_activity_for_user(
        &self,
        user_id: i64,
        limit: u32,
    ) -> Result<Vec<ActivityLog>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM activity_logs WHERE user_id = ?1
                     ORDER BY created_at DESC, id DESC LIMIT ?2"
                ),
                libsql::params![user_id, i64::from(limit)],
            )
            .await?;
        collect_rows(rows, row_to_activity).await
    }
}
