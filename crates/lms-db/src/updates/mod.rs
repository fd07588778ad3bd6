//! Partial update types for entity mutations.
//!
//! Each update struct has `Option` fields; only `Some` fields generate SET
//! clauses in the dynamic UPDATE SQL. Nullable columns use
//! `Option<Option<T>>` so that an explicit JSON `null` clears the column while
//! an absent key leaves it untouched. The structs deserialize directly from
//! camelCase PUT bodies.

pub mod assessment;
pub mod attempt;
pub mod category;
pub mod course;
pub mod group;
pub mod lesson;
pub mod module;
pub mod question;
pub mod user;
