//! Repository modules implementing storage operations for all LMS entities.
//!
//! Each module adds methods to `LmsService` via `impl LmsService` blocks.

pub mod access;
pub mod activity;
pub mod analytics;
pub mod assessment;
pub mod attempt;
pub mod category;
pub mod certificate;
pub mod course;
pub mod enrollment;
pub mod group;
pub mod lesson;
pub mod module;
pub mod progress;
pub mod question;
pub mod user;
