//! Router assembly and the serve loop.

use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::http::{HeaderValue, Method, header::CONTENT_TYPE};
use lms_config::ServerConfig;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::routes;
use crate::session::{session_layer, spawn_expired_cleanup};
use crate::state::AppState;

/// CORS for the configured origins, with cookies allowed. `None` when no
/// origins are configured.
fn cors_layer(config: &ServerConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(Duration::from_secs(60 * 60)),
    )
}

/// The complete application: routes, static uploads, sessions, tracing and
/// CORS.
pub fn build_router(state: AppState) -> Router {
    let store = state.service.session_store();
    let uploads = ServeDir::new(&state.config.uploads.dir);

    let mut router = routes::api_router(&state)
        .nest_service("/uploads", uploads)
        .layer(session_layer(store, &state.config.session))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(&state.config.server) {
        router = router.layer(cors);
    }

    router.with_state(state)
}

/// Bind, serve until Ctrl-C or SIGTERM, then stop the session sweeper.
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let address = state.config.server.bind_addr();
    let cleanup = spawn_expired_cleanup(
        state.service.session_store(),
        Duration::from_secs(state.config.session.cleanup_interval_secs.max(1)),
    );

    let app = build_router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    tracing::info!(%address, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    cleanup.abort();
    tracing::info!("server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("received Ctrl+C, shutting down"),
            Err(error) => {
                tracing::error!(%error, "failed to install Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("received terminate signal, shutting down");
            }
            Err(error) => {
                tracing::error!(%error, "failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
