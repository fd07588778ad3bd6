use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use lms_core::entities::Enrollment;
use lms_core::responses::EnrollmentWithCourse;
use lms_db::inputs::NewEnrollment;

use crate::error::{ApiResult, OrNotFound};
use crate::extract::{ApiJson, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/enrollments", get(list_enrollments).post(enroll))
        .route("/api/enrollments/{id}", delete(delete_enrollment))
}

async fn list_enrollments(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<EnrollmentWithCourse>>> {
    Ok(Json(state.db().list_enrollments_with_courses(user.id()).await?))
}

async fn enroll(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(new): ApiJson<NewEnrollment>,
) -> ApiResult<(StatusCode, Json<Enrollment>)> {
    let enrollment = state
        .db()
        .enroll(user.id(), new.course_id)
        .await
        .or_not_found("Course")?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

async fn delete_enrollment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let enrollment = state.db().get_enrollment(id).await.or_not_found("Enrollment")?;
    user.ensure_self_or_admin(enrollment.user_id)?;
    state.db().delete_enrollment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
