use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Issued once per (user, course) when the course reaches 100% progress.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub issue_date: DateTime<Utc>,
    pub certificate_url: Option<String>,
}
