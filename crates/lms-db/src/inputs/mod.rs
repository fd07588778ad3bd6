//! Insert payloads for entity creation.
//!
//! Content payloads deserialize straight from camelCase request bodies. Fields
//! the server fills in from the session (instructor, user) are passed to the
//! repo method separately rather than trusted from the body.

pub mod content;
pub mod learner;
pub mod people;

pub use content::{NewAssessment, NewCategory, NewCourse, NewLesson, NewModule, NewQuestion};
pub use learner::{NewAttempt, NewEnrollment, NewLessonProgress};
pub use people::{NewCourseAccess, NewGroup, NewGroupMember, NewUser};

use crate::error::DatabaseError;

/// Reject blank required text fields.
pub(crate) fn require(field: &str, value: &str) -> Result<(), DatabaseError> {
    if value.trim().is_empty() {
        return Err(DatabaseError::Validation(format!("{field} is required")));
    }
    Ok(())
}
