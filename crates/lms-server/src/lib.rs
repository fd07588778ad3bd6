//! # lms-server
//!
//! The LMS HTTP API: an axum router over [`lms_db::LmsService`] with
//! cookie sessions stored in the database.
//!
//! - `app` assembles the router, its layers and the serve loop
//! - `routes/` holds one module per resource
//! - `extract` provides the session-backed user extractors
//! - `error` maps every domain error onto a JSON response

pub mod app;
pub mod error;
pub mod extract;
pub mod routes;
pub mod seed;
pub mod session;
pub mod state;

pub use app::{build_router, serve};
pub use error::ApiError;
pub use state::AppState;
