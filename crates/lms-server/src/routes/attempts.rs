//! Assessment attempts: start, update and graded submission.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use lms_core::entities::AssessmentAttempt;
use lms_core::responses::{AttemptResult, StartAttemptResponse};
use lms_db::inputs::NewAttempt;
use lms_db::updates::attempt::AttemptUpdate;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult, OrNotFound};
use crate::extract::{ApiJson, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/assessment-attempts", get(list_attempts).post(create_attempt))
        .route("/api/assessment-attempts/{id}", put(update_attempt))
        .route("/api/assessment-attempts/{id}/submit", post(submit_attempt))
        .route(
            "/api/modules/{module_id}/assessment-attempts/start",
            post(start_module_attempt),
        )
}

async fn owned_attempt(
    state: &AppState,
    user: &CurrentUser,
    id: i64,
) -> Result<AssessmentAttempt, ApiError> {
    let attempt = state.db().get_attempt(id).await.or_not_found("Attempt")?;
    if attempt.user_id != user.id() {
        return Err(ApiError::forbidden());
    }
    Ok(attempt)
}

async fn list_attempts(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<AssessmentAttempt>>> {
    Ok(Json(state.db().list_attempts_for_user(user.id()).await?))
}

async fn create_attempt(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(new): ApiJson<NewAttempt>,
) -> ApiResult<(StatusCode, Json<AssessmentAttempt>)> {
    let attempt = state
        .db()
        .create_attempt(user.id(), new.assessment_id)
        .await
        .or_not_found("Assessment")?;
    Ok((StatusCode::CREATED, Json(attempt)))
}

/// Starts on the module's first assessment and returns its questions
/// without answers.
async fn start_module_attempt(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(module_id): Path<i64>,
) -> ApiResult<(StatusCode, Json<StartAttemptResponse>)> {
    state.db().get_module(module_id).await.or_not_found("Module")?;
    let started = state
        .db()
        .start_module_attempt(user.id(), module_id)
        .await
        .or_not_found("Assessment")?;
    Ok((StatusCode::CREATED, Json(started)))
}

async fn update_attempt(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ApiJson(update): ApiJson<AttemptUpdate>,
) -> ApiResult<Json<AssessmentAttempt>> {
    owned_attempt(&state, &user, id).await?;
    Ok(Json(state.db().update_attempt(id, update).await?))
}

#[derive(Debug, Deserialize)]
struct SubmitRequest {
    #[serde(default)]
    answers: BTreeMap<String, String>,
}

async fn submit_attempt(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ApiJson(body): ApiJson<SubmitRequest>,
) -> ApiResult<Json<AttemptResult>> {
    owned_attempt(&state, &user, id).await?;
    let result = state.db().submit_attempt(id, body.answers).await?;
    tracing::info!(attempt_id = id, score = result.score, passed = result.passed, "attempt submitted");
    Ok(Json(result))
}
