use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use lms_core::entities::LessonProgress;
use lms_db::inputs::NewLessonProgress;

use crate::error::{ApiResult, OrNotFound};
use crate::extract::{ApiJson, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/lesson-progress", get(list_progress).post(record_progress))
}

async fn list_progress(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<LessonProgress>>> {
    Ok(Json(state.db().list_lesson_progress(user.id()).await?))
}

/// Upsert the caller's status for a lesson. Completing a lesson also
/// recomputes the course enrollment's progress.
async fn record_progress(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(input): ApiJson<NewLessonProgress>,
) -> ApiResult<(StatusCode, Json<LessonProgress>)> {
    let progress = state
        .db()
        .upsert_lesson_progress(user.id(), &input)
        .await
        .or_not_found("Lesson")?;
    Ok((StatusCode::CREATED, Json(progress)))
}
