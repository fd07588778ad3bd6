//! Local account sign-up, sign-in and sign-out.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use lms_auth::password::{hash_password_async, verify_password_async};
use lms_auth::AuthError;
use lms_core::entities::User;
use lms_core::enums::Role;
use lms_core::responses::MessageResponse;
use lms_db::inputs::NewUser;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, CurrentUser};
use crate::session;
use crate::state::AppState;

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/user", get(current_user))
        .route("/api/forgot-password", post(forgot_password))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_picture: Option<String>,
}

impl RegisterRequest {
    fn problems(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.username.trim().is_empty() {
            errors.push("username is required".to_string());
        }
        if !self.email.contains('@') {
            errors.push("email must be a valid address".to_string());
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(format!("password must be at least {MIN_PASSWORD_LEN} characters"));
        }
        errors
    }
}

/// Public sign-up. Always creates an employee; other roles are assigned by
/// an admin.
async fn register(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let errors = body.problems();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let password = hash_password_async(body.password).await?;
    let user = state
        .db()
        .create_user(&NewUser {
            username: body.username,
            email: body.email,
            password,
            first_name: body.first_name,
            last_name: body.last_name,
            role: Role::Employee,
            profile_picture: body.profile_picture,
        })
        .await?;

    session::login(&session, user.id).await?;
    tracing::info!(user_id = user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<Json<User>> {
    let Some(user) = state.db().find_user_by_email(body.email.trim()).await? else {
        return Err(ApiError::InvalidCredentials);
    };

    match verify_password_async(body.password, user.password.clone()).await {
        Ok(true) => {}
        Ok(false) | Err(AuthError::MalformedHash) => return Err(ApiError::InvalidCredentials),
        Err(e) => return Err(e.into()),
    }

    session::login(&session, user.id).await?;
    tracing::info!(user_id = user.id, "user logged in");
    Ok(Json(user))
}

async fn logout(session: Session) -> ApiResult<Json<MessageResponse>> {
    session::logout(&session).await?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

async fn current_user(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

/// Same answer whether or not the address is registered.
async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ForgotPasswordRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let known = state.db().find_user_by_email(body.email.trim()).await?.is_some();
    tracing::debug!(known, "password reset requested");
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "If an account with that email exists, a password reset link has been sent."
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn register_problems_are_collected() {
        let body = RegisterRequest {
            username: " ".into(),
            email: "nope".into(),
            password: "123".into(),
            first_name: None,
            last_name: None,
            profile_picture: None,
        };
        assert_eq!(body.problems().len(), 3);
    }

    #[test]
    fn six_characters_is_enough() {
        let body = RegisterRequest {
            username: "ann".into(),
            email: "ann@example.com".into(),
            password: "abcdef".into(),
            first_name: None,
            last_name: None,
            profile_picture: None,
        };
        assert!(body.problems().is_empty());
    }
}
