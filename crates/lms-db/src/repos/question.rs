//! Question repository.

use lms_core::entities::Question;

use crate::error::DatabaseError;
use crate::helpers::{SetClause, collect_rows, get_opt_string, parse_enum, parse_json, to_json};
use crate::inputs::NewQuestion;
use crate::service::LmsService;
use crate::updates::question::QuestionUpdate;

const SELECT_COLS: &str = "id, assessment_id, question_text, question_type, options, correct_answer, explanation, points, position";

fn row_to_question(row: &libsql::Row) -> Result<Question, DatabaseError> {
    Ok(Question {
        id: row.get(0)?,
        assessment_id: row.get(1)?,
        question_text: row.get(2)?,
        question_type: parse_enum(&row.get::<String>(3)?)?,
        options: parse_json(&row.get::<String>(4)?)?,
        correct_answer: get_opt_string(row, 5)?,
        explanation: get_opt_string(row, 6)?,
        points: row.get(7)?,
        position: row.get(8)?,
    })
}

impl LmsService {
    pub async fn create_question(&self, new: &NewQuestion) -> Result<Question, DatabaseError> {
        new.validate()?;
        self.get_assessment(new.assessment_id).await?;

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "INSERT INTO questions (assessment_id, question_text, question_type, options, correct_answer, explanation, points, position)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, COALESCE(?8, (SELECT COALESCE(MAX(position) + 1, 0) FROM questions WHERE assessment_id = ?1)))
                     RETURNING {SELECT_COLS}"
                ),
                libsql::params![
                    new.assessment_id,
                    new.question_text.as_str(),
                    new.question_type.as_str(),
                    to_json(&new.options)?,
                    new.correct_answer.as_deref(),
                    new.explanation.as_deref(),
                    new.points,
                    new.position
                ],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_question(&row)
    }

    pub async fn get_question(&self, id: i64) -> Result<Question, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM questions WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_question(&row)
    }

    /// Questions of an assessment ordered by position.
    pub async fn list_questions(&self, assessment_id: i64) -> Result<Vec<Question>, DatabaseError> {
        let rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM questions WHERE assessment_id = ?1 ORDER BY position, id"
                ),
                [assessment_id],
            )
            .await?;
        collect_rows(rows, row_to_question).await
    }

    pub async fn update_question(
        &self,
        id: i64,
        update: QuestionUpdate,
    ) -> Result<Question, DatabaseError> {
        let mut set = SetClause::new();
        if let Some(text) = update.question_text {
            set.push("question_text", text);
        }
        if let Some(question_type) = update.question_type {
            set.push("question_type", question_type.as_str());
        }
        if let Some(options) = update.options {
            set.push("options", to_json(&options)?);
        }
        if let Some(correct_answer) = update.correct_answer {
            set.push_nullable("correct_answer", correct_answer);
        }
        if let Some(explanation) = update.explanation {
            set.push_nullable("explanation", explanation);
        }
        if let Some(points) = update.points {
            set.push("points", points);
        }
        if let Some(position) = update.position {
            set.push("position", position);
        }
        if set.is_empty() {
            return self.get_question(id).await;
        }

        let (sql, params) = set.into_update("questions", id);
        let affected = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_question(id).await
    }

    pub async fn delete_question(&self, id: i64) -> Result<(), DatabaseError> {
        self.delete_by_id("questions", id).await
    }
}
