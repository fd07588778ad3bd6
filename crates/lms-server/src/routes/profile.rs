use axum::extract::State;
use axum::routing::{get, put};
use axum::{Json, Router};
use lms_auth::password::{hash_password_async, verify_password_async};
use lms_core::entities::User;
use lms_core::responses::MessageResponse;
use lms_db::updates::user::UserUpdate;
use serde::Deserialize;

use super::auth::MIN_PASSWORD_LEN;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/api/profile/password", put(change_password))
}

async fn get_profile(State(state): State<AppState>, user: CurrentUser) -> ApiResult<Json<User>> {
    Ok(Json(state.db().get_user(user.id()).await?))
}

/// Only names and picture; role and email stay with admins.
async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult<Json<User>> {
    let updated = state.db().update_user(user.id(), update.profile_only()).await?;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePassword {
    current_password: String,
    new_password: String,
}

async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<ChangePassword>,
) -> ApiResult<Json<MessageResponse>> {
    if body.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(vec![format!(
            "newPassword must be at least {MIN_PASSWORD_LEN} characters"
        )]));
    }
    if !verify_password_async(body.current_password, user.password.clone()).await? {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }

    let hash = hash_password_async(body.new_password).await?;
    state.db().set_user_password(user.id, &hash).await?;
    tracing::info!(user_id = user.id, "password changed");
    Ok(Json(MessageResponse::new("Password updated successfully")))
}
