use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lms_core::entities::Module;
use lms_db::inputs::NewModule;
use lms_db::updates::module::ModuleUpdate;

use crate::error::{ApiResult, OrNotFound};
use crate::extract::{ApiJson, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/courses/{course_id}/modules", get(list_modules))
        .route("/api/modules", post(create_module))
        .route(
            "/api/modules/{id}",
            get(get_module).put(update_module).delete(delete_module),
        )
}

async fn list_modules(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(course_id): Path<i64>,
) -> ApiResult<Json<Vec<Module>>> {
    state.db().get_course(course_id).await.or_not_found("Course")?;
    Ok(Json(state.db().list_modules(course_id).await?))
}

async fn get_module(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Module>> {
    Ok(Json(state.db().get_module(id).await.or_not_found("Module")?))
}

async fn create_module(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(new): ApiJson<NewModule>,
) -> ApiResult<(StatusCode, Json<Module>)> {
    let course = state.db().get_course(new.course_id).await.or_not_found("Course")?;
    user.ensure_can_edit(&course)?;
    let module = state.db().create_module(&new).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

async fn update_module(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    ApiJson(update): ApiJson<ModuleUpdate>,
) -> ApiResult<Json<Module>> {
    let course = state.db().course_for_module(id).await.or_not_found("Module")?;
    user.ensure_can_edit(&course)?;
    Ok(Json(state.db().update_module(id, update).await?))
}

async fn delete_module(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let course = state.db().course_for_module(id).await.or_not_found("Module")?;
    user.ensure_can_edit(&course)?;
    state.db().delete_module(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
