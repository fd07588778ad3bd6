use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use lms_core::entities::Certificate;

use crate::error::{ApiResult, OrNotFound};
use crate::extract::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/certificates", get(list_certificates))
        .route("/api/certificates/{id}", get(get_certificate))
}

/// Admins see every certificate; everyone else sees their own.
async fn list_certificates(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<Certificate>>> {
    let certificates = if user.is_admin() {
        state.db().list_certificates().await?
    } else {
        state.db().list_certificates_for_user(user.id()).await?
    };
    Ok(Json(certificates))
}

async fn get_certificate(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<Certificate>> {
    let certificate = state.db().get_certificate(id).await.or_not_found("Certificate")?;
    user.ensure_self_or_admin(certificate.user_id)?;
    Ok(Json(certificate))
}
