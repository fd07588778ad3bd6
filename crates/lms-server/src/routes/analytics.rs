use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use lms_core::responses::AnalyticsOverview;

use crate::error::ApiResult;
use crate::extract::AdminUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/analytics/overview", get(overview))
}

async fn overview(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<AnalyticsOverview>> {
    Ok(Json(state.db().analytics_overview().await?))
}
