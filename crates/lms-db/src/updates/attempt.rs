//! Assessment attempt update.

use std::collections::BTreeMap;

use lms_core::enums::AttemptStatus;
use lms_core::serde_util::double_option;
use serde::{Deserialize, Serialize};

/// Partial attempt update. Moving `status` out of `in_progress` stamps
/// `completedAt`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answers: Option<BTreeMap<String, String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub score: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AttemptStatus>,
}

pub struct AttemptUpdateBuilder(AttemptUpdate);

impl AttemptUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(AttemptUpdate::default())
    }

    #[must_use]
    pub fn answers(mut self, answers: BTreeMap<String, String>) -> Self {
        self.0.answers = Some(answers);
        self
    }

    #[must_use]
    pub fn score(mut self, score: Option<i64>) -> Self {
        self.0.score = Some(score);
        self
    }

    #[must_use]
    pub fn status(mut self, status: AttemptStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn build(self) -> AttemptUpdate {
        self.0
    }
}

impl Default for AttemptUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
