use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{AttemptStatus, QuestionType};

/// A quiz, optionally attached to a module.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub module_id: Option<i64>,
    /// Minutes.
    pub time_limit: Option<i64>,
    /// Percent required to pass. `None` means the assessment is ungraded
    /// pass/fail and attempts end as `completed`.
    pub passing_score: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,
    pub assessment_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: serde_json::Value,
    pub correct_answer: Option<String>,
    pub explanation: Option<String>,
    pub points: i64,
    pub position: i64,
}

impl Question {
    /// Copy with the answer key and explanation removed, for learners.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            correct_answer: None,
            explanation: None,
            ..self.clone()
        }
    }
}

/// One user's attempt at an assessment. `answers` maps question id to the
/// answer given.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentAttempt {
    pub id: i64,
    pub user_id: i64,
    pub assessment_id: i64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub score: Option<i64>,
    pub answers: BTreeMap<String, String>,
    pub status: AttemptStatus,
}
