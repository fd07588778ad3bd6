//! Cookie session wiring: the layer, login/logout helpers and the expired
//! row sweeper.

use std::time::Duration;

use lms_config::SessionConfig;
use lms_db::LibSqlSessionStore;
use tower_sessions::session_store::ExpiredDeletion;
use tower_sessions::{Expiry, Session, SessionManagerLayer};

use crate::error::ApiError;

/// Session key holding the signed-in user's id.
pub const USER_ID_KEY: &str = "user_id";
/// Session key holding the pending OAuth `state`.
pub const OAUTH_STATE_KEY: &str = "oauth_state";

#[must_use]
pub fn session_layer(
    store: LibSqlSessionStore,
    config: &SessionConfig,
) -> SessionManagerLayer<LibSqlSessionStore> {
    SessionManagerLayer::new(store)
        .with_name(config.cookie_name.clone())
        .with_secure(config.secure)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(config.max_age_days)))
}

/// Bind `user_id` to the session under a fresh session id.
pub async fn login(session: &Session, user_id: i64) -> Result<(), ApiError> {
    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user_id).await?;
    tracing::debug!(user_id, "session established");
    Ok(())
}

/// Drop the session record and clear the cookie.
pub async fn logout(session: &Session) -> Result<(), ApiError> {
    session.flush().await?;
    Ok(())
}

pub async fn current_user_id(session: &Session) -> Result<Option<i64>, ApiError> {
    Ok(session.get::<i64>(USER_ID_KEY).await?)
}

/// Spawn the task that purges expired session rows every `interval`.
pub fn spawn_expired_cleanup(
    store: LibSqlSessionStore,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if let Err(error) = store.delete_expired().await {
                tracing::warn!(%error, "failed to delete expired sessions");
            }
        }
    })
}
