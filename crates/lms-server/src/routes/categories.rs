use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use lms_core::entities::Category;
use lms_db::inputs::NewCategory;
use lms_db::updates::category::CategoryUpdate;

use crate::error::{ApiResult, OrNotFound};
use crate::extract::{AdminUser, ApiJson, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(list_categories).post(create_category))
        .route("/api/categories/{id}", put(update_category).delete(delete_category))
}

async fn list_categories(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db().list_categories().await?))
}

async fn create_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(new): ApiJson<NewCategory>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let category = state.db().create_category(&new).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

async fn update_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ApiJson(update): ApiJson<CategoryUpdate>,
) -> ApiResult<Json<Category>> {
    Ok(Json(state.db().update_category(id, update).await.or_not_found("Category")?))
}

async fn delete_category(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.db().delete_category(id).await.or_not_found("Category")?;
    Ok(StatusCode::NO_CONTENT)
}
