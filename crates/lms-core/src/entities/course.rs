use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{CourseStatus, Difficulty};

/// A course. `instructor_id` is the owner; it becomes `None` when the
/// instructor's account is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    /// Minutes.
    pub duration: Option<i64>,
    pub difficulty: Option<Difficulty>,
    pub instructor_id: Option<i64>,
    pub category_id: Option<i64>,
    pub status: CourseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    #[must_use]
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.instructor_id == Some(user_id)
    }
}
