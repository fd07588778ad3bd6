//! Lesson repository.

use lms_core::entities::Lesson;

use crate::error::DatabaseError;
use crate::helpers::{SetClause, collect_rows, get_opt_string};
use crate::inputs::NewLesson;
use crate::service::LmsService;
use crate::updates::lesson::LessonUpdate;

const SELECT_COLS: &str = "id, module_id, title, content, video_url, duration, position";

fn row_to_lesson(row: &libsql::Row) -> Result<Lesson, DatabaseError> {
    Ok(Lesson {
        id: row.get(0)?,
        module_id: row.get(1)?,
        title: row.get(2)?,
        content: get_opt_string(row, 3)?,
        video_url: get_opt_string(row, 4)?,
        duration: row.get::<Option<i64>>(5)?,
        position: row.get(6)?,
    })
}

impl LmsService {
    /// Append a lesson to a module. Without an explicit position it goes
    /// after the last existing lesson.
    pub async fn create_lesson(&self, new: &NewLesson) -> Result<Lesson, DatabaseError> {
        new.validate()?;
        self.get_module(new.module_id).await?;

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "INSERT INTO lessons (module_id, title, content, video_url, duration, position)
                     VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, (SELECT COALESCE(MAX(position) + 1, 0) FROM lessons WHERE module_id = ?1)))
                     RETURNING {SELECT_COLS}"
                ),
                libsql::params![
                    new.module_id,
                    new.title.trim(),
                    new.content.as_deref(),
                    new.video_url.as_deref(),
                    new.duration,
                    new.position
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_lesson(&row)
    }

    pub async fn get_lesson(&self, id: i64) -> Result<Lesson, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM lessons WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_lesson(&row)
    }

    /// Lessons of a module ordered by position.
    pub async fn list_lessons(&self, module_id: i64) -> Result<Vec<Lesson>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM lessons WHERE module_id = ?1 ORDER BY position, id"
                ),
                [module_id],
            )
            .await?;
        collect_rows(rows, row_to_lesson).await
    }

    pub async fn update_lesson(&self, id: i64, update: LessonUpdate) -> Result<Lesson, DatabaseError> {
        let mut set = SetClause::new();
        if let Some(module_id) = update.module_id {
            self.get_module(module_id).await?;
            set.push("module_id", module_id);
        }
        if let Some(title) = update.title {
            set.push("title", title.trim().to_string());
        }
        if let Some(content) = update.content {
            set.push_nullable("content", content);
        }
        if let Some(video_url) = update.video_url {
            set.push_nullable("video_url", video_url);
        }
        if let Some(duration) = update.duration {
            set.push_nullable("duration", duration);
        }
        if let Some(position) = update.position {
            set.push("position", position);
        }
        if set.is_empty() {
            return self.get_lesson(id).await;
        }

        let (sql, params) = set.into_update("lessons", id);
        let affected = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_lesson(id).await
    }

    pub async fn delete_lesson(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_by_id("lessons", id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::NewModule;
    use crate::test_support::helpers::{new_course, test_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn lesson_crud() {
        let svc = test_service().await;
        let course = svc.create_course(None, &new_course("C")).await.unwrap();
        let module = svc
            .create_module(&NewModule {
                course_id: course.id,
                title: "M".into(),
                position: None,
            })
            .await
            .unwrap();

        let lesson = svc
            .create_lesson(&NewLesson {
                module_id: module.id,
                title: "Welcome".into(),
                content: Some("Hello".into()),
                video_url: None,
                duration: Some(300),
                position: None,
            })
            .await
            .unwrap();
        assert_eq!(lesson.position, 0);
        assert_eq!(svc.list_lessons(module.id).await.unwrap(), vec![lesson.clone()]);
        assert_eq!(svc.course_for_lesson(lesson.id).await.unwrap().id, course.id);

        let updated = svc
            .update_lesson(
                lesson.id,
                LessonUpdate {
                    video_url: Some(Some("/uploads/videos/a.mp4".into())),
                    content: Some(None),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.video_url.as_deref(), Some("/uploads/videos/a.mp4"));
        assert_eq!(updated.content, None);

        svc.delete_lesson(lesson.id).await.unwrap();
        assert!(svc.list_lessons(module.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_module_is_no_result() {
        let svc = test_service().await;
        let err = svc
            .create_lesson(&NewLesson {
                module_id: 5,
                title: "L".into(),
                content: None,
                video_url: None,
                duration: None,
                position: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NoResult));
    }
}
