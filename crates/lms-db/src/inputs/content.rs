//! Course content payloads: categories, courses, modules, lessons,
//! assessments, questions.

use lms_core::enums::{Difficulty, QuestionType};
use serde::{Deserialize, Serialize};

use super::require;
use crate::error::DatabaseError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), DatabaseError> {
        require("name", &self.name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub category_id: Option<i64>,
}

impl NewCourse {
    pub fn validate(&self) -> Result<(), DatabaseError> {
        require("title", &self.title)?;
        require("description", &self.description)
    }
}

/// `position` defaults to the end of the course.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewModule {
    pub course_id: i64,
    pub title: String,
    #[serde(default)]
    pub position: Option<i64>,
}

impl NewModule {
    pub fn validate(&self) -> Result<(), DatabaseError> {
        require("title", &self.title)
    }
}

/// `position` defaults to the end of the module.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLesson {
    pub module_id: i64,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub position: Option<i64>,
}

impl NewLesson {
    pub fn validate(&self) -> Result<(), DatabaseError> {
        require("title", &self.title)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssessment {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub module_id: Option<i64>,
    #[serde(default)]
    pub time_limit: Option<i64>,
    #[serde(default)]
    pub passing_score: Option<i64>,
}

impl NewAssessment {
    pub fn validate(&self) -> Result<(), DatabaseError> {
        require("title", &self.title)?;
        if let Some(score) = self.passing_score {
            if !(0..=100).contains(&score) {
                return Err(DatabaseError::Validation(
                    "passingScore must be between 0 and 100".into(),
                ));
            }
        }
        Ok(())
    }
}

fn default_options() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

const fn default_points() -> i64 {
    1
}

/// `position` defaults to the end of the assessment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub assessment_id: i64,
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default = "default_options")]
    pub options: serde_json::Value,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default = "default_points")]
    pub points: i64,
    #[serde(default)]
    pub position: Option<i64>,
}

impl NewQuestion {
    pub fn validate(&self) -> Result<(), DatabaseError> {
        require("questionText", &self.question_text)?;
        if self.points < 0 {
            return Err(DatabaseError::Validation("points must not be negative".into()));
        }
        Ok(())
    }
}
