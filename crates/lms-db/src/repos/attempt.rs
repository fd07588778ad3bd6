//! Assessment attempts: start, partial update, and graded submission.

use std::collections::BTreeMap;

use chrono::Utc;

use lms_core::entities::AssessmentAttempt;
use lms_core::enums::{ActivityAction, AttemptStatus};
use lms_core::progress::{attempt_status, grade};
use lms_core::responses::{AttemptResult, StartAttemptResponse};

use crate::error::DatabaseError;
use crate::helpers::{
    SetClause, collect_rows, parse_datetime, parse_enum, parse_json, parse_optional_datetime,
    to_json,
};
use crate::service::LmsService;
use crate::updates::attempt::AttemptUpdate;

const SELECT_COLS: &str =
    "id, user_id, assessment_id, started_at, completed_at, score, answers, status";

fn row_to_attempt(row: &libsql::Row) -> Result<AssessmentAttempt, DatabaseError> {
    Ok(AssessmentAttempt {
        id: row.get(0)?,
        user_id: row.get(1)?,
        assessment_id: row.get(2)?,
        started_at: parse_datetime(&row.get::<String>(3)?)?,
        completed_at: parse_optional_datetime(row.get::<Option<String>>(4)?.as_deref())?,
        score: row.get::<Option<i64>>(5)?,
        answers: parse_json(&row.get::<String>(6)?)?,
        status: parse_enum(&row.get::<String>(7)?)?,
    })
}

impl LmsService {
    /// Start an attempt and log `started_assessment`.
    pub async fn create_attempt(
        &self,
        user_id: i64,
        assessment_id: i64,
    ) -> Result<AssessmentAttempt, DatabaseError> {
        self.get_assessment(assessment_id).await?;

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "INSERT INTO assessment_attempts (user_id, assessment_id, started_at, answers, status)
                     VALUES (?1, ?2, ?3, '{{}}', ?4)
                     RETURNING {SELECT_COLS}"
                ),
                libsql::params![
                    user_id,
                    assessment_id,
                    Utc::now().to_rfc3339(),
                    AttemptStatus::InProgress.as_str()
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let attempt = row_to_attempt(&row)?;

        self.log_activity(
            user_id,
            ActivityAction::StartedAssessment,
            assessment_id,
            serde_json::json!({ "attemptId": attempt.id }),
        )
        .await?;
        Ok(attempt)
    }

    /// Start an attempt on a module's first assessment. Questions come back
    /// without answers or explanations.
    pub async fn start_module_attempt(
        &self,
        user_id: i64,
        module_id: i64,
    ) -> Result<StartAttemptResponse, DatabaseError> {
        let assessment = self.first_assessment_for_module(module_id).await?;
        let attempt = self.create_attempt(user_id, assessment.id).await?;
        let questions = self
            .list_questions(assessment.id)
            .await?
            .iter()
            .map(lms_core::entities::Question::redacted)
            .collect();
        Ok(StartAttemptResponse { attempt, questions })
    }

    pub async fn get_attempt(&self, id: i64) -> Result<AssessmentAttempt, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM assessment_attempts WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_attempt(&row)
    }

    pub async fn list_attempts_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<AssessmentAttempt>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM assessment_attempts WHERE user_id = ?1
                     ORDER BY started_at DESC, id DESC"
                ),
                [user_id],
            )
            .await?;
        collect_rows(rows, row_to_attempt).await
    }

    /// Partial update. Leaving `in_progress` stamps `completedAt` and logs
    /// `completed_assessment`; finished attempts cannot change status.
    pub async fn update_attempt(
        &self,
        id: i64,
        update: AttemptUpdate,
    ) -> Result<AssessmentAttempt, DatabaseError> {
        let current = self.get_attempt(id).await?;

        let mut set = SetClause::new();
        let mut finishing = false;
        if let Some(answers) = &update.answers {
            set.push("answers", to_json(answers)?);
        }
        if let Some(score) = update.score {
            set.push_nullable("score", score);
        }
        if let Some(status) = update.status.filter(|s| *s != current.status) {
            if !current.status.can_transition_to(status) {
                return Err(DatabaseError::InvalidState(format!(
                    "Cannot transition attempt {id} from {} to {status}",
                    current.status
                )));
            }
            set.push("status", status.as_str());
            set.push("completed_at", Utc::now().to_rfc3339());
            finishing = true;
        }
        if set.is_empty() {
            return Ok(current);
        }

        let (sql, params) = set.into_update("assessment_attempts", id);
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        let attempt = self.get_attempt(id).await?;

        if finishing {
            self.log_activity(
                attempt.user_id,
                ActivityAction::CompletedAssessment,
                attempt.assessment_id,
                serde_json::json!({ "score": attempt.score }),
            )
            .await?;
        }
        Ok(attempt)
    }

    /// Grade `answers`, finish the attempt and log the outcome.
    ///
    /// `passed` is false only when the assessment has a passing score that
    /// was not reached.
    pub async fn submit_attempt(
        &self,
        id: i64,
        answers: BTreeMap<String, String>,
    ) -> Result<AttemptResult, DatabaseError> {
        let attempt = self.get_attempt(id).await?;
        if attempt.status.is_finished() {
            return Err(DatabaseError::InvalidState(
                "Attempt has already been submitted".into(),
            ));
        }

        let assessment = self.get_assessment(attempt.assessment_id).await?;
        let questions = self.list_questions(assessment.id).await?;
        let graded = grade(&questions, &answers);
        let status = attempt_status(graded.score, assessment.passing_score);

        self.db()
            .conn()
            .execute(
                "UPDATE assessment_attempts SET answers = ?1, score = ?2, status = ?3, completed_at = ?4
                 WHERE id = ?5",
                libsql::params![
                    to_json(&answers)?,
                    graded.score,
                    status.as_str(),
                    Utc::now().to_rfc3339(),
                    id
                ],
            )
            .await?;
        let attempt = self.get_attempt(id).await?;

        self.log_activity(
            attempt.user_id,
            ActivityAction::CompletedAssessment,
            assessment.id,
            serde_json::json!({ "score": graded.score }),
        )
        .await?;
        tracing::info!(
            attempt_id = id,
            score = graded.score,
            earned = graded.earned,
            possible = graded.possible,
            status = %status,
            "attempt graded"
        );

        Ok(AttemptResult {
            attempt,
            score: graded.score,
            passed: status != AttemptStatus::Failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{NewAssessment, NewModule, NewQuestion};
    use crate::test_support::helpers::{new_course, new_user, test_service};
    use crate::updates::attempt::AttemptUpdateBuilder;
    use lms_core::enums::{QuestionType, Role};
    use pretty_assertions::assert_eq;

    async fn quiz(svc: &LmsService, passing_score: Option<i64>) -> (i64, i64, Vec<i64>) {
        let course = svc.create_course(None, &new_course("C")).await.unwrap();
        let module = svc
            .create_module(&NewModule {
                course_id: course.id,
                title: "M".into(),
                position: None,
            })
            .await
            .unwrap();
        let assessment = svc
            .create_assessment(&NewAssessment {
                title: "Quiz".into(),
                description: None,
                module_id: Some(module.id),
                time_limit: None,
                passing_score,
            })
            .await
            .unwrap();

        let mut ids = Vec::new();
        for (answer, points) in [(Some("Paris"), 3), (Some("true"), 1), (None, 5)] {
            let q = svc
                .create_question(&NewQuestion {
                    assessment_id: assessment.id,
                    question_text: "?".into(),
                    question_type: QuestionType::ShortAnswer,
                    options: serde_json::json!([]),
                    correct_answer: answer.map(str::to_string),
                    explanation: Some("because".into()),
                    points,
                    position: None,
                })
                .await
                .unwrap();
            ids.push(q.id);
        }
        (module.id, assessment.id, ids)
    }

    #[tokio::test]
    async fn start_on_module_redacts_questions() {
        let svc = test_service().await;
        let user = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let (module_id, assessment_id, _) = quiz(&svc, Some(70)).await;

        let started = svc.start_module_attempt(user.id, module_id).await.unwrap();
        assert_eq!(started.attempt.assessment_id, assessment_id);
        assert_eq!(started.attempt.status, AttemptStatus::InProgress);
        assert_eq!(started.questions.len(), 3);
        assert!(started.questions.iter().all(|q| q.correct_answer.is_none()));
        assert!(started.questions.iter().all(|q| q.explanation.is_none()));

        let activity = svc.list_activity_for_user(user.id, 10).await.unwrap();
        assert_eq!(activity[0].action, ActivityAction::StartedAssessment);
    }

    #[tokio::test]
    async fn submit_grades_by_points() {
        let svc = test_service().await;
        let user = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let (_, assessment_id, ids) = quiz(&svc, Some(70)).await;
        let attempt = svc.create_attempt(user.id, assessment_id).await.unwrap();

        let answers = BTreeMap::from([
            (ids[0].to_string(), "  paris ".to_string()),
            (ids[1].to_string(), "false".to_string()),
        ]);
        let result = svc.submit_attempt(attempt.id, answers).await.unwrap();
        assert_eq!(result.score, 75);
        assert!(result.passed);
        assert_eq!(result.attempt.status, AttemptStatus::Passed);
        assert_eq!(result.attempt.score, Some(75));
        assert!(result.attempt.completed_at.is_some());
    }

    #[tokio::test]
    async fn submit_below_passing_fails() {
        let svc = test_service().await;
        let user = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let (_, assessment_id, _) = quiz(&svc, Some(70)).await;
        let attempt = svc.create_attempt(user.id, assessment_id).await.unwrap();

        let result = svc.submit_attempt(attempt.id, BTreeMap::new()).await.unwrap();
        assert_eq!(result.score, 0);
        assert!(!result.passed);
        assert_eq!(result.attempt.status, AttemptStatus::Failed);
    }

    #[tokio::test]
    async fn no_passing_score_completes() {
        let svc = test_service().await;
        let user = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let (_, assessment_id, _) = quiz(&svc, None).await;
        let attempt = svc.create_attempt(user.id, assessment_id).await.unwrap();

        let result = svc.submit_attempt(attempt.id, BTreeMap::new()).await.unwrap();
        assert_eq!(result.attempt.status, AttemptStatus::Completed);
        assert!(result.passed);
    }

    #[tokio::test]
    async fn resubmitting_is_invalid_state() {
        let svc = test_service().await;
        let user = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let (_, assessment_id, _) = quiz(&svc, None).await;
        let attempt = svc.create_attempt(user.id, assessment_id).await.unwrap();

        svc.submit_attempt(attempt.id, BTreeMap::new()).await.unwrap();
        let err = svc.submit_attempt(attempt.id, BTreeMap::new()).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidState(_)));
    }

    #[tokio::test]
    async fn update_to_completed_stamps_and_logs_once() {
        let svc = test_service().await;
        let user = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let (_, assessment_id, _) = quiz(&svc, None).await;
        let attempt = svc.create_attempt(user.id, assessment_id).await.unwrap();

        let update = AttemptUpdateBuilder::new()
            .score(Some(90))
            .status(AttemptStatus::Completed)
            .build();
        let updated = svc.update_attempt(attempt.id, update.clone()).await.unwrap();
        assert_eq!(updated.score, Some(90));
        assert!(updated.completed_at.is_some());

        // Same status again is not a transition.
        svc.update_attempt(attempt.id, update).await.unwrap();
        let completions = svc
            .list_activity_for_user(user.id, 50)
            .await
            .unwrap()
            .into_iter()
            .filter(|a| a.action == ActivityAction::CompletedAssessment)
            .count();
        assert_eq!(completions, 1);

        let reopen = AttemptUpdateBuilder::new().status(AttemptStatus::InProgress).build();
        assert!(matches!(
            svc.update_attempt(attempt.id, reopen).await,
            Err(DatabaseError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn attempts_listed_per_user() {
        let svc = test_service().await;
        let ann = svc.create_user(&new_user("ann", Role::Employee)).await.unwrap();
        let bob = svc.create_user(&new_user("bob", Role::Employee)).await.unwrap();
        let (_, assessment_id, _) = quiz(&svc, None).await;

        svc.create_attempt(ann.id, assessment_id).await.unwrap();
        svc.create_attempt(ann.id, assessment_id).await.unwrap();
        svc.create_attempt(bob.id, assessment_id).await.unwrap();
        assert_eq!(svc.list_attempts_for_user(ann.id).await.unwrap().len(), 2);
    }
}
