//! Entity structs for all LMS domain objects.
//!
//! Each entity maps to one table in the libSQL database. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema`; field names serialize as
//! camelCase, which is the shape the REST API returns.

mod access;
mod activity;
mod assessment;
mod category;
mod certificate;
mod course;
mod enrollment;
mod group;
mod lesson;
mod module;
mod progress;
mod user;

pub use access::CourseAccess;
pub use activity::ActivityLog;
pub use assessment::{Assessment, AssessmentAttempt, Question};
pub use category::Category;
pub use certificate::Certificate;
pub use course::Course;
pub use enrollment::Enrollment;
pub use group::{Group, GroupMember};
pub use lesson::Lesson;
pub use module::Module;
pub use progress::LessonProgress;
pub use user::User;
