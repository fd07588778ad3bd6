use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lms_core::entities::Lesson;
use lms_db::inputs::NewLesson;
use lms_db::updates::lesson::LessonUpdate;

use crate::error::{ApiResult, OrNotFound};
use crate::extract::{ApiJson, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/modules/{module_id}/lessons", get(list_lessons))
        .route("/api/lessons", post(create_lesson))
        .route(
            "/api/lessons/{id}",
            get(get_lesson).put(update_lesson).delete(delete_lesson),
        )
}

async fn list_lessons(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(module_id): Path<i64>,
) -> ApiResult<Json<Vec<Lesson>>> {
    state.db().get_module(module_id).await.or_not_found("Module")?;
    Ok(Json(state.db().list_lessons(module_id).await?))
}

async fn get_lesson(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Lesson>> {
    Ok(Json(state.db().get_lesson(id).await.or_not_found("Lesson")?))
}

async fn create_lesson(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(new): ApiJson<NewLesson>,
) -> ApiResult<(StatusCode, Json<Lesson>)> {
    let course = state.db().course_for_module(new.module_id).await.or_not_found("Module")?;
    user.ensure_can_edit(&course)?;
    let lesson = state.db().create_lesson(&new).await?;
    Ok((StatusCode::CREATED, Json(lesson)))
}

/// Moving a lesson needs edit rights on both courses.
async fn update_lesson(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ApiJson(update): ApiJson<LessonUpdate>,
) -> ApiResult<Json<Lesson>> {
    let course = state.db().course_for_lesson(id).await.or_not_found("Lesson")?;
    user.ensure_can_edit(&course)?;
    if let Some(module_id) = update.module_id {
        let target = state.db().course_for_module(module_id).await.or_not_found("Module")?;
        user.ensure_can_edit(&target)?;
    }
    Ok(Json(state.db().update_lesson(id, update).await?))
}

async fn delete_lesson(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let course = state.db().course_for_lesson(id).await.or_not_found("Lesson")?;
    user.ensure_can_edit(&course)?;
    state.db().delete_lesson(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
