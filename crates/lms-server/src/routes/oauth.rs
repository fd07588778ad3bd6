//! Google and Microsoft sign-in.
//!
//! `GET /api/auth/{provider}` stores a random `state` in the session and
//! redirects to the provider. The callback checks it, resolves the profile
//! to a local account (created on first sign-in) and starts a session.

use axum::extract::{Path, Query, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::Router;
use lms_auth::oauth::{check_state, generate_state};
use lms_auth::password::hash_password_async;
use lms_auth::{OAuthClient, OAuthProfile, Provider, random_password};
use lms_core::entities::User;
use lms_core::enums::Role;
use lms_db::inputs::NewUser;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{ApiError, ApiResult};
use crate::session::{self, OAUTH_STATE_KEY};
use crate::state::AppState;

/// Where the browser lands when sign-in fails after the provider redirect.
const FAILURE_REDIRECT: &str = "/auth?error=oauth";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/{provider}", get(authorize))
        .route("/api/auth/{provider}/callback", get(callback))
}

fn client_for(state: &AppState, provider: &str) -> Result<OAuthClient, ApiError> {
    let provider: Provider = provider.parse()?;
    let redirect_uri = state
        .config
        .server
        .url_for(&format!("/api/auth/{provider}/callback"));
    Ok(OAuthClient::from_config(provider, &state.config.oauth, redirect_uri)?)
}

async fn authorize(
    State(state): State<AppState>,
    session: Session,
    Path(provider): Path<String>,
) -> ApiResult<Redirect> {
    let client = client_for(&state, &provider)?;
    let csrf = generate_state()?;
    session.insert(OAUTH_STATE_KEY, &csrf).await?;
    Ok(Redirect::to(&client.authorize_url(&csrf)))
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

async fn callback(
    State(state): State<AppState>,
    session: Session,
    Path(provider): Path<String>,
    Query(params): Query<CallbackParams>,
) -> ApiResult<Redirect> {
    let client = client_for(&state, &provider)?;
    let expected: Option<String> = session.remove(OAUTH_STATE_KEY).await?;

    match complete_sign_in(&state, &client, expected.as_deref(), params).await {
        Ok(user) => {
            session::login(&session, user.id).await?;
            tracing::info!(user_id = user.id, provider = %client.provider, "OAuth sign-in");
            Ok(Redirect::to("/"))
        }
        Err(error) => {
            tracing::warn!(%error, provider = %client.provider, "OAuth sign-in failed");
            Ok(Redirect::to(FAILURE_REDIRECT))
        }
    }
}

async fn complete_sign_in(
    state: &AppState,
    client: &OAuthClient,
    expected_state: Option<&str>,
    params: CallbackParams,
) -> Result<User, ApiError> {
    if let Some(error) = params.error {
        return Err(ApiError::bad_request(format!("provider returned error: {error}")));
    }
    check_state(expected_state, params.state.as_deref())?;
    let code = params
        .code
        .ok_or_else(|| ApiError::bad_request("missing authorization code"))?;

    let token = client.exchange_code(&state.http, &code).await?;
    let profile = client.fetch_profile(&state.http, &token).await?;
    find_or_create_user(state, profile).await
}

/// Match on email; otherwise create an employee with an unusable random
/// password and a username derived from the email.
pub async fn find_or_create_user(state: &AppState, profile: OAuthProfile) -> Result<User, ApiError> {
    if let Some(user) = state.db().find_user_by_email(&profile.email).await? {
        return Ok(user);
    }

    let username = unique_username(state, &profile.email).await?;
    let password = hash_password_async(random_password(32)?).await?;
    let user = state
        .db()
        .create_user(&NewUser {
            username,
            email: profile.email,
            password,
            first_name: profile.first_name,
            last_name: profile.last_name,
            role: Role::Employee,
            profile_picture: profile.picture,
        })
        .await?;
    tracing::info!(user_id = user.id, "account created from OAuth profile");
    Ok(user)
}

fn username_base(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    let base: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    if base.is_empty() { "user".to_string() } else { base }
}

async fn unique_username(state: &AppState, email: &str) -> Result<String, ApiError> {
    let base = username_base(email);
    if state.db().find_user_by_username(&base).await?.is_none() {
        return Ok(base);
    }
    loop {
        let candidate = format!("{base}-{}", random_password(3)?);
        if state.db().find_user_by_username(&candidate).await?.is_none() {
            return Ok(candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn username_from_email() {
        assert_eq!(username_base("ann.lee@corp.test"), "ann.lee");
        assert_eq!(username_base("o'brien+x@corp.test"), "obrienx");
        assert_eq!(username_base("@corp.test"), "user");
    }
}
