//! Enrollment repository and course progress recomputation.

use chrono::Utc;

use lms_core::entities::Enrollment;
use lms_core::enums::ActivityAction;
use lms_core::progress::course_progress;
use lms_core::responses::EnrollmentWithCourse;

use crate::error::DatabaseError;
use crate::helpers::{collect_rows, first_row, parse_datetime, parse_optional_datetime};
use crate::repos::course::{qualified_cols as course_cols, row_to_course_at};
use crate::service::LmsService;

const SELECT_COLS: &str = "id, user_id, course_id, enrolled_at, completed_at, progress";
/// Column count of `SELECT_COLS`, the offset of joined columns.
const ENROLLMENT_COLS: i32 = 6;

fn row_to_enrollment(row: &libsql::Row) -> Result<Enrollment, DatabaseError> {
    Ok(Enrollment {
        id: row.get(0)?,
        user_id: row.get(1)?,
        course_id: row.get(2)?,
        enrolled_at: parse_datetime(&row.get::<String>(3)?)?,
        completed_at: parse_optional_datetime(row.get::<Option<String>>(4)?.as_deref())?,
        progress: row.get(5)?,
    })
}

fn qualified_cols(alias: &str) -> String {
    SELECT_COLS
        .split(", ")
        .map(|col| format!("{alias}.{col}"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl LmsService {
    /// Enroll a user in a course and log it.
    pub async fn enroll(&self, user_id: i64, course_id: i64) -> Result<Enrollment, DatabaseError> {
        self.get_course(course_id).await?;

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "INSERT INTO enrollments (user_id, course_id, enrolled_at, progress)
                     VALUES (?1, ?2, ?3, 0)
                     RETURNING {SELECT_COLS}"
                ),
                libsql::params![user_id, course_id, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| DatabaseError::from(e).on_unique("Already enrolled in this course"))?;
        let row = first_row(&mut rows, |e| e.on_unique("Already enrolled in this course")).await?;
        let enrollment = row_to_enrollment(&row)?;

        self.log_activity(user_id, ActivityAction::Enrolled, course_id, serde_json::json!({}))
            .await?;
        tracing::info!(user_id, course_id, "user enrolled");
        Ok(enrollment)
    }

    pub async fn get_enrollment(&self, id: i64) -> Result<Enrollment, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM enrollments WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_enrollment(&row)
    }

    pub async fn find_enrollment(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM enrollments WHERE user_id = ?1 AND course_id = ?2"
                ),
                libsql::params![user_id, course_id],
            )
            .await?;
        rows.next().await?.map(|row| row_to_enrollment(&row)).transpose()
    }

    /// A learner's enrollments with the course embedded, newest first.
    pub async fn list_enrollments_with_courses(
        &self,
        user_id: i64,
    ) -> Result<Vec<EnrollmentWithCourse>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {}, {} FROM enrollments e JOIN courses c ON c.id = e.course_id
                     WHERE e.user_id = ?1 ORDER BY e.enrolled_at DESC, e.id DESC",
                    qualified_cols("e"),
                    course_cols("c")
                ),
                [user_id],
            )
            .await?;
        collect_rows(rows, |row| {
            Ok(EnrollmentWithCourse {
                enrollment: row_to_enrollment(row)?,
                course: row_to_course_at(row, ENROLLMENT_COLS)?,
            })
        })
        .await
    }

    pub async fn list_course_enrollments(
        &self,
        course_id: i64,
    ) -> Result<Vec<Enrollment>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM enrollments WHERE course_id = ?1 ORDER BY enrolled_at, id"
                ),
                [course_id],
            )
            .await?;
        collect_rows(rows, row_to_enrollment).await
    }

    pub async fn delete_enrollment(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_by_id("enrollments", id).await
    }

    /// Recompute a user's progress in a course from completed lessons.
    ///
    /// Returns `None` when the user is not enrolled. Read then write without
    /// a transaction; concurrent completions race and the last write wins.
    /// Reaching 100 for the first time stamps `completedAt`, logs the
    /// completion and issues a certificate.
    pub async fn recompute_progress(
        &self,
        user_id: i64,
        course_id: i64,
    ) -> Result<Option<Enrollment>, DatabaseError> {
        let Some(enrollment) = self.find_enrollment(user_id, course_id).await? else {
            tracing::debug!(user_id, course_id, "no enrollment to update");
            return Ok(None);
        };

        let total = self
            .count(
                "SELECT COUNT(*) FROM lessons l JOIN modules m ON m.id = l.module_id
                 WHERE m.course_id = ?1",
                [course_id],
            )
            .await?;
        let completed = self
            .count(
                "SELECT COUNT(*) FROM lesson_progress lp
                 JOIN lessons l ON l.id = lp.lesson_id
                 JOIN modules m ON m.id = l.module_id
                 WHERE m.course_id = ?1 AND lp.user_id = ?2 AND lp.status = 'completed'",
                libsql::params![course_id, user_id],
            )
            .await?;

        let progress = course_progress(
            u64::try_from(completed).unwrap_or(0),
            u64::try_from(total).unwrap_or(0),
        );
        let newly_completed = progress >= 100 && enrollment.completed_at.is_none();

        if newly_completed {
            self.db()
                .conn()
                .execute(
                    "UPDATE enrollments SET progress = ?1, completed_at = ?2 WHERE id = ?3",
                    libsql::params![progress, Utc::now().to_rfc3339(), enrollment.id],
                )
                .await?;
            self.log_activity(
                user_id,
                ActivityAction::CompletedCourse,
                course_id,
                serde_json::json!({}),
            )
            .await?;
            self.issue_certificate(user_id, course_id).await?;
            tracing::info!(user_id, course_id, "course completed");
        } else {
            self.db()
                .conn()
                .execute(
                    "UPDATE enrollments SET progress = ?1 WHERE id = ?2",
                    libsql::params![progress, enrollment.id],
                )
                .await?;
        }
        tracing::debug!(user_id, course_id, completed, total, progress, "progress recomputed");

        self.get_enrollment(enrollment.id).await.map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{new_course, new_user, test_service};
    use lms_core::enums::Role;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn enroll_logs_and_embeds_course() {
        let svc = test_service().await;
        let user = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let course = svc.create_course(None, &new_course("Rust")).await.unwrap();

        let enrollment = svc.enroll(user.id, course.id).await.unwrap();
        assert_eq!(enrollment.progress, 0);
        assert_eq!(enrollment.completed_at, None);

        let listed = svc.list_enrollments_with_courses(user.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].enrollment, enrollment);
        assert_eq!(listed[0].course.title, "Rust");

        let activity = svc.list_activity_for_user(user.id, 10).await.unwrap();
        assert_eq!(activity[0].action, ActivityAction::Enrolled);
        assert_eq!(activity[0].resource_id, Some(course.id));
    }

    #[tokio::test]
    async fn duplicate_enrollment_is_conflict() {
        let svc = test_service().await;
        let user = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let course = svc.create_course(None, &new_course("Rust")).await.unwrap();

        svc.enroll(user.id, course.id).await.unwrap();
        let err = svc.enroll(user.id, course.id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(ref m) if m == "Already enrolled in this course"));
    }

    #[tokio::test]
    async fn unknown_course_is_no_result() {
        let svc = test_service().await;
        let user = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        assert!(matches!(svc.enroll(user.id, 404).await, Err(DatabaseError::NoResult)));
    }

    #[tokio::test]
    async fn empty_course_progress_is_zero() {
        let svc = test_service().await;
        let user = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let course = svc.create_course(None, &new_course("Empty")).await.unwrap();
        svc.enroll(user.id, course.id).await.unwrap();

        let updated = svc.recompute_progress(user.id, course.id).await.unwrap().unwrap();
        assert_eq!(updated.progress, 0);
        assert_eq!(updated.completed_at, None);
    }

    #[tokio::test]
    async fn recompute_without_enrollment_is_none() {
        let svc = test_service().await;
        let user = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let course = svc.create_course(None, &new_course("C")).await.unwrap();
        assert_eq!(svc.recompute_progress(user.id, course.id).await.unwrap(), None);
    }
}
