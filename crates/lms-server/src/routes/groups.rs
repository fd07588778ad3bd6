//! Groups and membership. Admin only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use lms_core::entities::{Group, GroupMember};
use lms_core::responses::GroupMemberWithUser;
use lms_db::inputs::{NewGroup, NewGroupMember};
use lms_db::updates::group::GroupUpdate;

use crate::error::{ApiResult, OrNotFound};
use crate::extract::{AdminUser, ApiJson};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/groups", get(list_groups).post(create_group))
        .route("/api/groups/{id}", put(update_group).delete(delete_group))
        .route("/api/groups/{group_id}/members", get(list_members))
        .route("/api/group-members", post(add_member))
        .route("/api/group-members/{id}", delete(remove_member))
}

async fn list_groups(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<Group>>> {
    Ok(Json(state.db().list_groups().await?))
}

async fn create_group(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(new): ApiJson<NewGroup>,
) -> ApiResult<(StatusCode, Json<Group>)> {
    Ok((StatusCode::CREATED, Json(state.db().create_group(&new).await?)))
}

async fn update_group(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ApiJson(update): ApiJson<GroupUpdate>,
) -> ApiResult<Json<Group>> {
    Ok(Json(state.db().update_group(id, update).await.or_not_found("Group")?))
}

async fn delete_group(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.db().delete_group(id).await.or_not_found("Group")?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_members(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(group_id): Path<i64>,
) -> ApiResult<Json<Vec<GroupMemberWithUser>>> {
    state.db().get_group(group_id).await.or_not_found("Group")?;
    Ok(Json(state.db().list_group_members_with_users(group_id).await?))
}

async fn add_member(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(new): ApiJson<NewGroupMember>,
) -> ApiResult<(StatusCode, Json<GroupMember>)> {
    let member = state
        .db()
        .add_group_member(&new)
        .await
        .or_not_found("Group or user")?;
    Ok((StatusCode::CREATED, Json(member)))
}

async fn remove_member(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.db().delete_group_member(id).await.or_not_found("Group member")?;
    Ok(StatusCode::NO_CONTENT)
}
