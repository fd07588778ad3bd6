//! HTTP routes, one module per resource. Each module exposes `router()`;
//! [`api_router`] merges them.

use axum::Router;

use crate::state::AppState;

pub mod access;
pub mod activity;
pub mod analytics;
pub mod assessments;
pub mod attempts;
pub mod auth;
pub mod categories;
pub mod certificates;
pub mod courses;
pub mod enrollments;
pub mod groups;
pub mod health;
pub mod lessons;
pub mod modules;
pub mod oauth;
pub mod profile;
pub mod progress;
pub mod questions;
pub mod upload;
pub mod users;

/// All routes, without layers or state.
pub fn api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(oauth::router())
        .merge(profile::router())
        .merge(users::router())
        .merge(categories::router())
        .merge(courses::router())
        .merge(modules::router())
        .merge(lessons::router())
        .merge(assessments::router())
        .merge(questions::router())
        .merge(attempts::router())
        .merge(enrollments::router())
        .merge(progress::router())
        .merge(groups::router())
        .merge(access::router())
        .merge(activity::router())
        .merge(certificates::router())
        .merge(analytics::router())
        .merge(upload::router(&state.config.uploads))
}
