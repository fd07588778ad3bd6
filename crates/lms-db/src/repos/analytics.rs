//! Aggregate counts for the admin dashboard.

use lms_core::responses::AnalyticsOverview;

use crate::error::DatabaseError;
use crate::service::LmsService;

impl LmsService {
    pub async fn analytics_overview(&self) -> Result<AnalyticsOverview, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT
                    (SELECT COUNT(*) FROM users),
                    (SELECT COUNT(*) FROM courses),
                    (SELECT COUNT(*) FROM courses WHERE status = 'published'),
                    (SELECT COUNT(*) FROM enrollments),
                    (SELECT COUNT(*) FROM enrollments WHERE completed_at IS NOT NULL),
                    (SELECT COUNT(*) FROM certificates),
                    (SELECT COALESCE(AVG(progress), 0.0) FROM enrollments)",
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(AnalyticsOverview {
            total_users: row.get(0)?,
            total_courses: row.get(1)?,
            published_courses: row.get(2)?,
            total_enrollments: row.get(3)?,
            completed_enrollments: row.get(4)?,
            certificates_issued: row.get(5)?,
            average_completion: row.get::<f64>(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::helpers::{course_with_lessons, new_user, test_service};
    use crate::inputs::NewLessonProgress;
    use lms_core::enums::{CourseStatus, LessonStatus, Role};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn empty_database_is_all_zero() {
        let svc = test_service().await;
        let overview = svc.analytics_overview().await.unwrap();
        assert_eq!(overview.total_users, 0);
        assert_eq!(overview.total_enrollments, 0);
        assert!(overview.average_completion.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn counts_and_average() {
        let svc = test_service().await;
        let ann = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let bob = svc.create_user(&new_user("bob", Role::Employee)).await.unwrap();
        let (course, lessons) = course_with_lessons(&svc, 1).await;
        svc.transition_course(course.id, CourseStatus::Pending).await.unwrap();
        svc.transition_course(course.id, CourseStatus::Published).await.unwrap();

        svc.enroll(ann.id, course.id).await.unwrap();
        svc.enroll(bob.id, course.id).await.unwrap();
        svc.upsert_lesson_progress(
            ann.id,
            &NewLessonProgress {
                lesson_id: lessons[0].id,
                status: LessonStatus::Completed,
            },
        )
        .await
        .unwrap();

        let overview = svc.analytics_overview().await.unwrap();
        assert_eq!(overview.total_users, 2);
        assert_eq!(overview.total_courses, 1);
        assert_eq!(overview.published_courses, 1);
        assert_eq!(overview.total_enrollments, 2);
        assert_eq!(overview.completed_enrollments, 1);
        assert_eq!(overview.certificates_issued, 1);
        assert!((overview.average_completion - 50.0).abs() < f64::EPSILON);
    }
}
