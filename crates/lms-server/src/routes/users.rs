//! Admin account management.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use lms_auth::password::hash_password_async;
use lms_auth::random_password;
use lms_core::entities::User;
use lms_core::enums::Role;
use lms_db::inputs::NewUser;
use lms_db::updates::user::UserUpdate;
use lms_mail::WelcomeEmail;
use serde::Deserialize;

use super::auth::MIN_PASSWORD_LEN;
use crate::error::{ApiError, ApiResult, OrNotFound};
use crate::extract::{AdminUser, ApiJson};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}", put(update_user).delete(delete_user))
}

async fn list_users(State(state): State<AppState>, _admin: AdminUser) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.db().list_users().await?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    /// Generated when absent.
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    pub profile_picture: Option<String>,
}

/// Create an account and mail its credentials. A failed email is logged;
/// the account stays.
async fn create_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let plain = match body.password {
        Some(pw) if pw.chars().count() < MIN_PASSWORD_LEN => {
            return Err(ApiError::Validation(vec![format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )]));
        }
        Some(pw) => pw,
        None => random_password(6)?,
    };

    let user = state
        .db()
        .create_user(&NewUser {
            username: body.username,
            email: body.email,
            password: hash_password_async(plain.clone()).await?,
            first_name: body.first_name,
            last_name: body.last_name,
            role: body.role,
            profile_picture: body.profile_picture,
        })
        .await?;

    let email = WelcomeEmail {
        app_name: state.config.general.app_name.clone(),
        username: user.username.clone(),
        role: user.role.to_string(),
        temporary_password: plain,
        login_url: state.config.server.url_for("/auth"),
    };
    if let Err(error) = state.mailer.send_welcome(&user.email, &email).await {
        tracing::error!(%error, user_id = user.id, "failed to send welcome email");
    }

    Ok((StatusCode::CREATED, Json(user)))
}

async fn update_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult<Json<User>> {
    let user = state.db().update_user(id, update).await.or_not_found("User")?;
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if id == admin.id() {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }
    state.db().delete_user(id).await.or_not_found("User")?;
    tracing::info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
