//! # lms-core
//!
//! Core types shared across all LMS crates:
//! - Entity structs for every table (users, courses, modules, lessons, ...)
//! - Status enums, with transition tables where a lifecycle exists
//! - Progress and grading arithmetic
//! - API response shapes
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod progress;
pub mod responses;
pub mod serde_util;
