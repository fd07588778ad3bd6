//! Course repository: CRUD, status transitions, and owner lookups for the
//! content nested under a course.

use chrono::Utc;

use lms_core::entities::Course;
use lms_core::enums::CourseStatus;

use crate::error::DatabaseError;
use crate::helpers::{
    SetClause, collect_rows, first_row, get_opt_string, parse_datetime, parse_enum,
    parse_optional_enum,
};
use crate::inputs::NewCourse;
use crate::service::LmsService;
use crate::updates::course::CourseUpdate;

const SELECT_COLS: &str = "id, title, description, thumbnail, duration, difficulty, instructor_id, category_id, status, created_at, updated_at";

pub(crate) fn row_to_course(row: &libsql::Row) -> Result<Course, DatabaseError> {
    row_to_course_at(row, 0)
}

/// Parse a course whose columns start at `offset` (for joined selects).
pub(crate) fn row_to_course_at(row: &libsql::Row, offset: i32) -> Result<Course, DatabaseError> {
    Ok(Course {
        id: row.get(offset)?,
        title: row.get(offset + 1)?,
        description: row.get(offset + 2)?,
        thumbnail: get_opt_string(row, offset + 3)?,
        duration: row.get::<Option<i64>>(offset + 4)?,
        difficulty: parse_optional_enum(get_opt_string(row, offset + 5)?.as_deref())?,
        instructor_id: row.get::<Option<i64>>(offset + 6)?,
        category_id: row.get::<Option<i64>>(offset + 7)?,
        status: parse_enum(&row.get::<String>(offset + 8)?)?,
        created_at: parse_datetime(&row.get::<String>(offset + 9)?)?,
        updated_at: parse_datetime(&row.get::<String>(offset + 10)?)?,
    })
}

/// Course columns qualified with a table alias, for joins.
pub(crate) fn qualified_cols(alias: &str) -> String {
    SELECT_COLS
        .split(", ")
        .map(|col| format!("{alias}.{col}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn invalid_transition(id: i64, from: CourseStatus, to: CourseStatus) -> DatabaseError {
    DatabaseError::InvalidState(format!("Cannot transition course {id} from {from} to {to}"))
}

impl LmsService {
    /// Create a draft course owned by `instructor_id`.
    pub async fn create_course(
        &self,
        instructor_id: Option<i64>,
        new: &NewCourse,
    ) -> Result<Course, DatabaseError> {
        new.validate()?;
        let now = Utc::now().to_rfc3339();
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "INSERT INTO courses (title, description, thumbnail, duration, difficulty, instructor_id, category_id, status, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                     RETURNING {SELECT_COLS}"
                ),
                libsql::params![
                    new.title.trim(),
                    new.description.as_str(),
                    new.thumbnail.as_deref(),
                    new.duration,
                    new.difficulty.map(|d| d.as_str()),
                    instructor_id,
                    new.category_id,
                    CourseStatus::Draft.as_str(),
                    now.as_str(),
                    now.as_str()
                ],
            )
            .await
            .map_err(|e| DatabaseError::from(e).on_foreign_key("Unknown category"))?;
        let row = first_row(&mut rows, |e| e.on_foreign_key("Unknown category")).await?;
        let course = row_to_course(&row)?;

        tracing::info!(course_id = course.id, ?instructor_id, "course created");
        Ok(course)
    }

    pub async fn get_course(&self, id: i64) -> Result<Course, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM courses WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_course(&row)
    }

    /// All courses, newest first.
    pub async fn list_courses(&self) -> Result<Vec<Course>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM courses ORDER BY created_at DESC, id DESC"),
                (),
            )
            .await?;
        collect_rows(rows, row_to_course).await
    }

    pub async fn list_courses_by_status(
        &self,
        status: CourseStatus,
    ) -> Result<Vec<Course>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM courses WHERE status = ?1 ORDER BY updated_at DESC, id DESC"
                ),
                [status.as_str()],
            )
            .await?;
        collect_rows(rows, row_to_course).await
    }

    pub async fn list_courses_by_instructor(
        &self,
        instructor_id: i64,
    ) -> Result<Vec<Course>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM courses WHERE instructor_id = ?1 ORDER BY created_at DESC, id DESC"
                ),
                [instructor_id],
            )
            .await?;
        collect_rows(rows, row_to_course).await
    }

    /// Partial update. A status change must be allowed by the transition
    /// table; setting the current status again is a no-op for that field.
    pub async fn update_course(&self, id: i64, update: CourseUpdate) -> Result<Course, DatabaseError> {
        let current = self.get_course(id).await?;

        let mut set = SetClause::new();
        if let Some(title) = update.title {
            set.push("title", title.trim().to_string());
        }
        if let Some(description) = update.description {
            set.push("description", description);
        }
        if let Some(thumbnail) = update.thumbnail {
            set.push_nullable("thumbnail", thumbnail);
        }
        if let Some(duration) = update.duration {
            set.push_nullable("duration", duration);
        }
        if let Some(difficulty) = update.difficulty {
            set.push_nullable("difficulty", difficulty.map(|d| d.as_str()));
        }
        if let Some(category_id) = update.category_id {
            set.push_nullable("category_id", category_id);
        }
        if let Some(status) = update.status {
            if status != current.status {
                if !current.status.can_transition_to(status) {
                    return Err(invalid_transition(id, current.status, status));
                }
                set.push("status", status.as_str());
            }
        }

        if set.is_empty() {
            return Ok(current);
        }
        set.push("updated_at", Utc::now().to_rfc3339());

        let (sql, params) = set.into_update("courses", id);
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await
            .map_err(|e| DatabaseError::from(e).on_foreign_key("Unknown category"))?;
        self.get_course(id).await
    }

    /// Move a course to `new_status`, enforcing the transition table.
    pub async fn transition_course(
        &self,
        id: i64,
        new_status: CourseStatus,
    ) -> Result<Course, DatabaseError> {
        let current = self.get_course(id).await?;
        if !current.status.can_transition_to(new_status) {
            return Err(invalid_transition(id, current.status, new_status));
        }

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE courses SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![new_status.as_str(), now.to_rfc3339(), id],
            )
            .await?;

        tracing::info!(course_id = id, from = %current.status, to = %new_status, "course status changed");
        Ok(Course {
            status: new_status,
            updated_at: now,
            ..current
        })
    }

    /// Delete a course with its modules, lessons, enrollments and grants.
    pub async fn delete_course(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_by_id("courses", id).await
    }

    /// The course a module belongs to.
    pub async fn course_for_module(&self, module_id: i64) -> Result<Course, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {} FROM courses c JOIN modules m ON m.course_id = c.id WHERE m.id = ?1",
                    qualified_cols("c")
                ),
                [module_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_course(&row)
    }

    /// The course a lesson belongs to.
    pub async fn course_for_lesson(&self, lesson_id: i64) -> Result<Course, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {} FROM courses c
                     JOIN modules m ON m.course_id = c.id
                     JOIN lessons l ON l.module_id = m.id
                     WHERE l.id = ?1",
                    qualified_cols("c")
                ),
                [lesson_id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_course(&row)
    }

    /// The course an assessment belongs to, or `None` for a standalone
    /// assessment. `NoResult` when the assessment does not exist.
    pub async fn course_for_assessment(
        &self,
        assessment_id: i64,
    ) -> Result<Option<Course>, DatabaseError> {
        let assessment = self.get_assessment(assessment_id).await?;
        match assessment.module_id {
            Some(module_id) => self.course_for_module(module_id).await.map(Some),
            None => Ok(None),
        }
    }
}
