use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{ActivityAction, ResourceType};

/// An append-only record of something a user did.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    pub id: i64,
    pub user_id: i64,
    pub action: ActivityAction,
    pub resource_type: Option<ResourceType>,
    pub resource_id: Option<i64>,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
