//! Lesson progress: per-user, per-lesson status rows.

use chrono::Utc;

use lms_core::entities::LessonProgress;
use lms_core::enums::{ActivityAction, LessonStatus};

use crate::error::DatabaseError;
use crate::helpers::{collect_rows, parse_datetime, parse_enum, parse_optional_datetime};
use crate::inputs::NewLessonProgress;
use crate::service::LmsService;

const SELECT_COLS: &str = "id, user_id, lesson_id, status, last_accessed_at, completed_at";

fn row_to_progress(row: &libsql::Row) -> Result<LessonProgress, DatabaseError> {
    Ok(LessonProgress {
        id: row.get(0)?,
        user_id: row.get(1)?,
        lesson_id: row.get(2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        last_accessed_at: parse_datetime(&row.get::<String>(4)?)?,
        completed_at: parse_optional_datetime(row.get::<Option<String>>(5)?.as_deref())?,
    })
}

impl LmsService {
    pub async fn list_lesson_progress(
        &self,
        user_id: i64,
    ) -> Result<Vec<LessonProgress>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM lesson_progress WHERE user_id = ?1
                     ORDER BY last_accessed_at DESC, id DESC"
                ),
                [user_id],
            )
            .await?;
        collect_rows(rows, row_to_progress).await
    }

    async fn find_lesson_progress(
        &self,
        user_id: i64,
        lesson_id: i64,
    ) -> Result<Option<LessonProgress>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM lesson_progress WHERE user_id = ?1 AND lesson_id = ?2"
                ),
                libsql::params![user_id, lesson_id],
            )
            .await?;
        rows.next().await?.map(|row| row_to_progress(&row)).transpose()
    }

    /// Record a learner's status for a lesson.
    ///
    /// One row per user and lesson; later posts overwrite the status and
    /// touch `lastAccessedAt`. A `completed` post recomputes the enrollment
    /// progress of the lesson's course; `completed_lesson` is logged only
    /// when the lesson was not already completed.
    pub async fn upsert_lesson_progress(
        &self,
        user_id: i64,
        input: &NewLessonProgress,
    ) -> Result<LessonProgress, DatabaseError> {
        let course = self.course_for_lesson(input.lesson_id).await?;
        let previous = self.find_lesson_progress(user_id, input.lesson_id).await?;

        let now = Utc::now().to_rfc3339();
        let completed_at = match (input.status, &previous) {
            (LessonStatus::Completed, Some(p)) if p.completed_at.is_some() => {
                p.completed_at.map(|at| at.to_rfc3339())
            }
            (LessonStatus::Completed, _) => Some(now.clone()),
            _ => None,
        };

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "INSERT INTO lesson_progress (user_id, lesson_id, status, last_accessed_at, completed_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT (user_id, lesson_id) DO UPDATE SET
                         status = excluded.status,
                         last_accessed_at = excluded.last_accessed_at,
                         completed_at = excluded.completed_at
                     RETURNING {SELECT_COLS}"
                ),
                libsql::params![
                    user_id,
                    input.lesson_id,
                    input.status.as_str(),
                    now,
                    completed_at
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let progress = row_to_progress(&row)?;

        if input.status == LessonStatus::Completed {
            let was_completed = previous.is_some_and(|p| p.status == LessonStatus::Completed);
            if !was_completed {
                self.log_activity(
                    user_id,
                    ActivityAction::CompletedLesson,
                    input.lesson_id,
                    serde_json::json!({ "courseId": course.id }),
                )
                .await?;
            }
            self.recompute_progress(user_id, course.id).await?;
        }

        Ok(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{course_with_lessons, new_user, test_service};
    use lms_core::enums::Role;
    use pretty_assertions::assert_eq;

    fn post(lesson_id: i64, status: LessonStatus) -> NewLessonProgress {
        NewLessonProgress { lesson_id, status }
    }

    #[tokio::test]
    async fn completing_lessons_updates_enrollment_progress() {
        let svc = test_service().await;
        let user = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let (course, lessons) = course_with_lessons(&svc, 3).await;
        svc.enroll(user.id, course.id).await.unwrap();

        svc.upsert_lesson_progress(user.id, &post(lessons[0].id, LessonStatus::Completed))
            .await
            .unwrap();
        let enrollment = svc.find_enrollment(user.id, course.id).await.unwrap().unwrap();
        assert_eq!(enrollment.progress, 33);

        svc.upsert_lesson_progress(user.id, &post(lessons[1].id, LessonStatus::Completed))
            .await
            .unwrap();
        let enrollment = svc.find_enrollment(user.id, course.id).await.unwrap().unwrap();
        assert_eq!(enrollment.progress, 67);
        assert_eq!(enrollment.completed_at, None);
    }

    #[tokio::test]
    async fn finishing_course_issues_certificate_once() {
        let svc = test_service().await;
        let user = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let (course, lessons) = course_with_lessons(&svc, 1).await;
        svc.enroll(user.id, course.id).await.unwrap();

        for _ in 0..2 {
            svc.upsert_lesson_progress(user.id, &post(lessons[0].id, LessonStatus::Completed))
                .await
                .unwrap();
        }

        let enrollment = svc.find_enrollment(user.id, course.id).await.unwrap().unwrap();
        assert_eq!(enrollment.progress, 100);
        assert!(enrollment.completed_at.is_some());
        assert_eq!(svc.list_certificates_for_user(user.id).await.unwrap().len(), 1);

        let actions: Vec<_> = svc
            .list_activity_for_user(user.id, 50)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.action)
            .collect();
        let lesson_logs = actions.iter().filter(|a| **a == ActivityAction::CompletedLesson).count();
        let course_logs = actions.iter().filter(|a| **a == ActivityAction::CompletedCourse).count();
        assert_eq!(lesson_logs, 1);
        assert_eq!(course_logs, 1);
    }

    #[tokio::test]
    async fn in_progress_upsert_keeps_one_row() {
        let svc = test_service().await;
        let user = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let (_, lessons) = course_with_lessons(&svc, 1).await;

        svc.upsert_lesson_progress(user.id, &post(lessons[0].id, LessonStatus::InProgress))
            .await
            .unwrap();
        let row = svc
            .upsert_lesson_progress(user.id, &post(lessons[0].id, LessonStatus::Completed))
            .await
            .unwrap();
        assert_eq!(row.status, LessonStatus::Completed);
        assert!(row.completed_at.is_some());
        assert_eq!(svc.list_lesson_progress(user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unknown_lesson_is_no_result() {
        let svc = test_service().await;
        let user = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let err = svc
            .upsert_lesson_progress(user.id, &post(9, LessonStatus::Completed))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NoResult));
    }
}
