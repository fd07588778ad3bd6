use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lms_core::entities::Assessment;
use lms_db::inputs::NewAssessment;
use lms_db::updates::assessment::AssessmentUpdate;

use crate::error::{ApiError, ApiResult, OrNotFound};
use crate::extract::{ApiJson, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/modules/{module_id}/assessments", get(list_assessments))
        .route("/api/assessments", post(create_assessment))
        .route(
            "/api/assessments/{id}",
            get(get_assessment).put(update_assessment).delete(delete_assessment),
        )
}

/// Edit rights for content hanging off `module_id`. Free-standing
/// assessments are open to any author.
async fn ensure_can_edit_module(
    state: &AppState,
    user: &CurrentUser,
    module_id: Option<i64>,
) -> Result<(), ApiError> {
    match module_id {
        Some(module_id) => {
            let course = state.db().course_for_module(module_id).await.or_not_found("Module")?;
            user.ensure_can_edit(&course)
        }
        None if user.0.role.can_author() => Ok(()),
        None => Err(ApiError::forbidden()),
    }
}

/// Edit rights for an existing assessment and everything under it.
pub(crate) async fn ensure_can_edit_assessment(
    state: &AppState,
    user: &CurrentUser,
    assessment_id: i64,
) -> Result<(), ApiError> {
    let assessment = state.db().get_assessment(assessment_id).await.or_not_found("Assessment")?;
    ensure_can_edit_module(state, user, assessment.module_id).await
}

async fn list_assessments(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(module_id): Path<i64>,
) -> ApiResult<Json<Vec<Assessment>>> {
    state.db().get_module(module_id).await.or_not_found("Module")?;
    Ok(Json(state.db().list_assessments_for_module(module_id).await?))
}

async fn get_assessment(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Assessment>> {
    Ok(Json(state.db().get_assessment(id).await.or_not_found("Assessment")?))
}

async fn create_assessment(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(new): ApiJson<NewAssessment>,
) -> ApiResult<(StatusCode, Json<Assessment>)> {
    ensure_can_edit_module(&state, &user, new.module_id).await?;
    let assessment = state.db().create_assessment(&new).await?;
    Ok((StatusCode::CREATED, Json(assessment)))
}

async fn update_assessment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ApiJson(update): ApiJson<AssessmentUpdate>,
) -> ApiResult<Json<Assessment>> {
    ensure_can_edit_assessment(&state, &user, id).await?;
    if let Some(target) = update.module_id {
        ensure_can_edit_module(&state, &user, target).await?;
    }
    Ok(Json(state.db().update_assessment(id, update).await?))
}

async fn delete_assessment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    ensure_can_edit_assessment(&state, &user, id).await?;
    state.db().delete_assessment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
