//! Response shapes returned by the REST API that are not plain entities.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{AssessmentAttempt, Course, Enrollment, GroupMember, Question, User};

/// An enrollment with its course embedded, as listed for the learner.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentWithCourse {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course: Course,
}

/// A group membership with the member's account embedded.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberWithUser {
    #[serde(flatten)]
    pub member: GroupMember,
    pub user: User,
}

/// Response from `POST /api/assessment-attempts/:id/submit`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AttemptResult {
    pub attempt: AssessmentAttempt,
    pub score: i64,
    pub passed: bool,
}

/// Response from `POST /api/modules/:moduleId/assessment-attempts/start`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StartAttemptResponse {
    pub attempt: AssessmentAttempt,
    pub questions: Vec<Question>,
}

/// Response from `GET /api/analytics/overview`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsOverview {
    pub total_users: i64,
    pub total_courses: i64,
    pub published_courses: i64,
    pub total_enrollments: i64,
    pub completed_enrollments: i64,
    pub certificates_issued: i64,
    /// Mean enrollment progress, 0 when there are no enrollments.
    pub average_completion: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response from `POST /api/upload/video`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}
