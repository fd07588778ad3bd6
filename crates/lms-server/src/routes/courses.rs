//! Courses, their approval workflow and per-course enrollment listing.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lms_core::entities::{Course, Enrollment};
use lms_core::enums::CourseStatus;
use lms_db::inputs::NewCourse;
use lms_db::updates::course::CourseUpdate;

use crate::error::{ApiError, ApiResult, OrNotFound};
use crate::extract::{AdminUser, ApiJson, AuthorUser, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/courses", get(list_courses).post(create_course))
        .route(
            "/api/courses/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/api/courses/{id}/approve", post(approve_course))
        .route("/api/courses/{id}/reject", post(reject_course))
        .route("/api/courses/{id}/enrollments", get(course_enrollments))
        .route("/api/pending-courses", get(pending_courses))
        .route("/api/published-courses", get(published_courses))
        .route("/api/rejected-courses", get(rejected_courses))
}

async fn list_courses(State(state): State<AppState>, _user: CurrentUser) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(state.db().list_courses().await?))
}

async fn get_course(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Course>> {
    Ok(Json(state.db().get_course(id).await.or_not_found("Course")?))
}

/// The caller becomes the instructor.
async fn create_course(
    State(state): State<AppState>,
    AuthorUser(user): AuthorUser,
    ApiJson(new): ApiJson<NewCourse>,
) -> ApiResult<(StatusCode, Json<Course>)> {
    let course = state.db().create_course(Some(user.id()), &new).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

/// Non-admins may only move their course into review.
async fn update_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ApiJson(update): ApiJson<CourseUpdate>,
) -> ApiResult<Json<Course>> {
    let course = state.db().get_course(id).await.or_not_found("Course")?;
    user.ensure_can_edit(&course)?;
    if !user.is_admin() && update.status.is_some_and(|s| s != CourseStatus::Pending) {
        return Err(ApiError::Forbidden("Only admins can publish or reject courses"));
    }
    Ok(Json(state.db().update_course(id, update).await?))
}

async fn delete_course(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let course = state.db().get_course(id).await.or_not_found("Course")?;
    user.ensure_can_edit(&course)?;
    state.db().delete_course(id).await?;
    tracing::info!(course_id = id, "course deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn by_status(state: &AppState, status: CourseStatus) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(state.db().list_courses_by_status(status).await?))
}

async fn pending_courses(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<Course>>> {
    by_status(&state, CourseStatus::Pending).await
}

async fn published_courses(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<Course>>> {
    by_status(&state, CourseStatus::Published).await
}

async fn rejected_courses(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<Course>>> {
    by_status(&state, CourseStatus::Rejected).await
}

async fn approve_course(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Course>> {
    let course = state
        .db()
        .transition_course(id, CourseStatus::Published)
        .await
        .or_not_found("Course")?;
    Ok(Json(course))
}

async fn reject_course(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Course>> {
    let course = state
        .db()
        .transition_course(id, CourseStatus::Rejected)
        .await
        .or_not_found("Course")?;
    Ok(Json(course))
}

async fn course_enrollments(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<Enrollment>>> {
    let course = state.db().get_course(id).await.or_not_found("Course")?;
    user.ensure_can_edit(&course)?;
    Ok(Json(state.db().list_course_enrollments(id).await?))
}
