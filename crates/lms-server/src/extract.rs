//! Request extractors: the signed-in user, role gates and a JSON body whose
//! rejection renders as an [`ApiError`].

use axum::extract::{FromRequest, FromRequestParts};
use axum::http::request::Parts;
use lms_core::entities::{Course, User};
use lms_db::error::DatabaseError;
use tower_sessions::Session;

use crate::error::ApiError;
use crate::session;
use crate::state::AppState;

/// JSON body extractor. Malformed bodies become a 400 validation error.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// The user bound to the request's session, freshly loaded from the
/// database. Rejects with 401 when there is none.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.0.id
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.0.role.is_admin()
    }

    /// Authors may change a course they own; admins may change any course.
    pub fn ensure_can_edit(&self, course: &Course) -> Result<(), ApiError> {
        if self.is_admin() || (self.0.role.can_author() && course.is_owned_by(self.id())) {
            Ok(())
        } else {
            Err(ApiError::forbidden())
        }
    }

    /// The row belongs to the caller, or the caller is an admin.
    pub fn ensure_self_or_admin(&self, owner_id: i64) -> Result<(), ApiError> {
        if self.is_admin() || owner_id == self.id() {
            Ok(())
        } else {
            Err(ApiError::forbidden())
        }
    }
}

pub(crate) async fn session_from_parts(
    parts: &mut Parts,
    state: &AppState,
) -> Result<Session, ApiError> {
    Session::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| ApiError::Internal(anyhow::anyhow!(msg)))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts, state).await?;
        let Some(user_id) = session::current_user_id(&session).await? else {
            return Err(ApiError::Unauthenticated);
        };

        match state.db().get_user(user_id).await {
            Ok(user) => Ok(Self(user)),
            Err(DatabaseError::NoResult) => {
                // Account deleted while signed in.
                session::logout(&session).await?;
                Err(ApiError::Unauthenticated)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// A signed-in admin. Other roles get 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(ApiError::forbidden());
        }
        Ok(Self(user))
    }
}

/// A signed-in contributor or admin. Employees get 403.
#[derive(Debug, Clone)]
pub struct AuthorUser(pub CurrentUser);

impl FromRequestParts<AppState> for AuthorUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.0.role.can_author() {
            return Err(ApiError::forbidden());
        }
        Ok(Self(user))
    }
}
