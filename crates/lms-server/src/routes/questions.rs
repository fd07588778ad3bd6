use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use lms_core::entities::Question;
use lms_db::inputs::NewQuestion;
use lms_db::updates::question::QuestionUpdate;

use super::assessments::ensure_can_edit_assessment;
use crate::error::{ApiResult, OrNotFound};
use crate::extract::{ApiJson, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/assessments/{assessment_id}/questions", get(list_questions))
        .route("/api/questions", post(create_question))
        .route("/api/questions/{id}", put(update_question).delete(delete_question))
}

/// Employees never see answer keys or explanations.
async fn list_questions(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(assessment_id): Path<i64>,
) -> ApiResult<Json<Vec<Question>>> {
    state.db().get_assessment(assessment_id).await.or_not_found("Assessment")?;
    let questions = state.db().list_questions(assessment_id).await?;
    if user.0.role.can_author() {
        return Ok(Json(questions));
    }
    Ok(Json(questions.iter().map(Question::redacted).collect()))
}

async fn create_question(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(new): ApiJson<NewQuestion>,
) -> ApiResult<(StatusCode, Json<Question>)> {
    ensure_can_edit_assessment(&state, &user, new.assessment_id).await?;
    let question = state.db().create_question(&new).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

async fn update_question(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ApiJson(update): ApiJson<QuestionUpdate>,
) -> ApiResult<Json<Question>> {
    let question = state.db().get_question(id).await.or_not_found("Question")?;
    ensure_can_edit_assessment(&state, &user, question.assessment_id).await?;
    Ok(Json(state.db().update_question(id, update).await?))
}

async fn delete_question(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let question = state.db().get_question(id).await.or_not_found("Question")?;
    ensure_can_edit_assessment(&state, &user, question.assessment_id).await?;
    state.db().delete_question(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
