use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AccessType;

/// A course grant to a single user or to every member of a group.
/// At least one of `user_id` / `group_id` is set.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CourseAccess {
    pub id: i64,
    pub course_id: i64,
    pub user_id: Option<i64>,
    pub group_id: Option<i64>,
    pub access_type: AccessType,
    pub granted_at: DateTime<Utc>,
}
