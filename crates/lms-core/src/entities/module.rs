use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An ordered section of a course.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub position: i64,
}
