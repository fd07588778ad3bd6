//! Assessment repository.

use chrono::Utc;

use lms_core::entities::Assessment;

use crate::error::DatabaseError;
use crate::helpers::{SetClause, collect_rows, get_opt_string, parse_datetime};
use crate::inputs::NewAssessment;
use crate::service::LmsService;
use crate::updates::assessment::AssessmentUpdate;

const SELECT_COLS: &str = "id, title, description, module_id, time_limit, passing_score, created_at";

fn row_to_assessment(row: &libsql::Row) -> Result<Assessment, DatabaseError> {
    Ok(Assessment {
        id: row.get(0)?,
        title: row.get(1)?,
        description: get_opt_string(row, 2)?,
        module_id: row.get::<Option<i64>>(3)?,
        time_limit: row.get::<Option<i64>>(4)?,
        passing_score: row.get::<Option<i64>>(5)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl LmsService {
    pub async fn create_assessment(&self, new: &NewAssessment) -> Result<Assessment, DatabaseError> {
        new.validate()?;
        if let Some(module_id) = new.module_id {
            self.get_module(module_id).await?;
        }

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "INSERT INTO assessments (title, description, module_id, time_limit, passing_score, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     RETURNING {SELECT_COLS}"
                ),
                libsql::params![
                    new.title.trim(),
                    new.description.as_deref(),
                    new.module_id,
                    new.time_limit,
                    new.passing_score,
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_assessment(&row)
    }

    pub async fn get_assessment(&self, id: i64) -> Result<Assessment, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM assessments WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_assessment(&row)
    }

    pub async fn list_assessments_for_module(
        &self,
        module_id: i64,
    ) -> Result<Vec<Assessment>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM assessments WHERE module_id = ?1 ORDER BY id"),
                [module_id],
            )
            .await?;
        collect_rows(rows, row_to_assessment).await
    }

    /// The earliest assessment attached to a module.
    pub async fn first_assessment_for_module(
        &self,
        module_id: i64,
    ) -> Result<Assessment, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM assessments WHERE module_id = ?1 ORDER BY id LIMIT 1"
                ),
                [module_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_assessment(&row)
    }

    pub async fn update_assessment(
        &self,
        id: i64,
        update: AssessmentUpdate,
    ) -> Result<Assessment, DatabaseError> {
        let mut set = SetClause::new();
        if let Some(title) = update.title {
            set.push("title", title.trim().to_string());
        }
        if let Some(description) = update.description {
            set.push_nullable("description", description);
        }
        if let Some(module_id) = update.module_id {
            if let Some(module_id) = module_id {
                self.get_module(module_id).await?;
            }
            set.push_nullable("module_id", module_id);
        }
        if let Some(time_limit) = update.time_limit {
            set.push_nullable("time_limit", time_limit);
        }
        if let Some(passing_score) = update.passing_score {
            set.push_nullable("passing_score", passing_score);
        }
        if set.is_empty() {
            return self.get_assessment(id).await;
        }

        let (sql, params) = set.into_update("assessments", id);
        let affected = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_assessment(id).await
    }

    pub async fn delete_assessment(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_by_id("assessments", id).await
    }
}
