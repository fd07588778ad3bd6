//! Course access grants, per user or per group.

use chrono::Utc;

use lms_core::entities::{Course, CourseAccess};

use crate::error::DatabaseError;
use crate::helpers::{collect_rows, parse_datetime, parse_enum};
use crate::inputs::NewCourseAccess;
use crate::repos::course::{qualified_cols as course_cols, row_to_course};
use crate::service::LmsService;

const SELECT_COLS: &str = "id, course_id, user_id, group_id, access_type, granted_at";

fn row_to_access(row: &libsql::Row) -> Result<CourseAccess, DatabaseError> {
    Ok(CourseAccess {
        id: row.get(0)?,
        course_id: row.get(1)?,
        user_id: row.get::<Option<i64>>(2)?,
        group_id: row.get::<Option<i64>>(3)?,
        access_type: parse_enum(&row.get::<String>(4)?)?,
        granted_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

impl LmsService {
    /// Grant a course to a user or a group. Every referenced row must exist.
    pub async fn grant_course_access(
        &self,
        new: &NewCourseAccess,
    ) -> Result<CourseAccess, DatabaseError> {
        new.validate()?;
        self.get_course(new.course_id).await?;
        if let Some(user_id) = new.user_id {
            self.get_user(user_id).await?;
        }
        if let Some(group_id) = new.group_id {
            self.get_group(group_id).await?;
        }

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "INSERT INTO course_access (course_id, user_id, group_id, access_type, granted_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     RETURNING {SELECT_COLS}"
                ),
                libsql::params![
                    new.course_id,
                    new.user_id,
                    new.group_id,
                    new.access_type.as_str(),
                    Utc::now().to_rfc3339()
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let grant = row_to_access(&row)?;
        tracing::info!(
            course_id = grant.course_id,
            user_id = ?grant.user_id,
            group_id = ?grant.group_id,
            access = %grant.access_type,
            "course access granted"
        );
        Ok(grant)
    }

    pub async fn list_course_access(&self) -> Result<Vec<CourseAccess>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM course_access ORDER BY granted_at DESC, id DESC"),
                (),
            )
            .await?;
        collect_rows(rows, row_to_access).await
    }

    pub async fn revoke_course_access(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_by_id("course_access", id).await
    }

    /// Courses granted to a user directly or through any of their groups.
    pub async fn accessible_courses(&self, user_id: i64) -> Result<Vec<Course>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT DISTINCT {} FROM courses c
                     JOIN course_access ca ON ca.course_id = c.id
                     LEFT JOIN group_members gm ON gm.group_id = ca.group_id
                     WHERE ca.user_id = ?1 OR gm.user_id = ?1
                     ORDER BY c.title, c.id",
                    course_cols("c")
                ),
                [user_id],
            )
            .await?;
        collect_rows(rows, row_to_course).await
    }
}
