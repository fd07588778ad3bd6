//! Course access grants and the learner's granted content.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use lms_core::entities::{Course, CourseAccess};
use lms_db::inputs::NewCourseAccess;

use crate::error::{ApiResult, OrNotFound};
use crate::extract::{AdminUser, ApiJson, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/course-access", get(list_access).post(grant_access))
        .route("/api/course-access/{id}", delete(revoke_access))
        .route("/api/my-content", get(my_content))
}

async fn list_access(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<CourseAccess>>> {
    Ok(Json(state.db().list_course_access().await?))
}

async fn grant_access(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(new): ApiJson<NewCourseAccess>,
) -> ApiResult<(StatusCode, Json<CourseAccess>)> {
    let grant = state
        .db()
        .grant_course_access(&new)
        .await
        .or_not_found("Course, user or group")?;
    Ok((StatusCode::CREATED, Json(grant)))
}

async fn revoke_access(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.db().revoke_course_access(id).await.or_not_found("Course access")?;
    Ok(StatusCode::NO_CONTENT)
}

/// Courses granted to the caller directly or through a group.
async fn my_content(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(state.db().accessible_courses(user.id()).await?))
}
