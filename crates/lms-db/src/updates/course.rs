//! Course update builder.

use lms_core::enums::{CourseStatus, Difficulty};
use lms_core::serde_util::double_option;
use serde::{Deserialize, Serialize};

/// Partial course update. A `status` change is checked against the course
/// status transition table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub thumbnail: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub duration: Option<Option<i64>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub difficulty: Option<Option<Difficulty>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub category_id: Option<Option<i64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CourseStatus>,
}

pub struct CourseUpdateBuilder(CourseUpdate);

impl CourseUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(CourseUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.0.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn thumbnail(mut self, thumbnail: Option<String>) -> Self {
        self.0.thumbnail = Some(thumbnail);
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Option<i64>) -> Self {
        self.0.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn status(mut self, status: CourseStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn build(self) -> CourseUpdate {
        self.0
    }
}

impl Default for CourseUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
