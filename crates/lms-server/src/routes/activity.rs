use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use lms_core::entities::ActivityLog;

use crate::error::ApiResult;
use crate::extract::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/activity-logs", get(list_activity))
}

/// The caller's most recent activity, newest first.
async fn list_activity(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<ActivityLog>>> {
    let limit = state.config.general.default_limit;
    Ok(Json(state.db().list_activity_for_user(user.id(), limit).await?))
}
