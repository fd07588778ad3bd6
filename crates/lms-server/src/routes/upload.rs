//! Video uploads, stored on disk and served from `/uploads`.

use std::path::{Path, PathBuf};

use axum::extract::multipart::Field;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::post;
use axum::{Json, Router};
use lms_config::UploadsConfig;
use lms_core::responses::UploadResponse;
use tokio::io::AsyncWriteExt;

use crate::error::{ApiError, ApiResult};
use crate::extract::AuthorUser;
use crate::state::AppState;

const FIELD_NAME: &str = "video";
/// Multipart framing on top of the file itself.
const ENVELOPE_BYTES: usize = 64 * 1024;

pub fn router(config: &UploadsConfig) -> Router<AppState> {
    Router::new().route(
        "/api/upload/video",
        post(upload_video).layer(DefaultBodyLimit::max(
            config.max_video_bytes.saturating_add(ENVELOPE_BYTES),
        )),
    )
}

/// Random hex name keeping a sanitized copy of the original extension.
fn stored_name(original: Option<&str>) -> Result<String, ApiError> {
    let mut bytes = [0u8; 16];
    getrandom::fill(&mut bytes).map_err(|e| anyhow::anyhow!("random source unavailable: {e}"))?;
    let stem: String = bytes.iter().map(|b| format!("{b:02x}")).collect();

    let ext = original
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase);

    Ok(match ext {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem,
    })
}

/// Stream `field` to `path`, failing with 413 past `max_bytes`. A partial
/// file is removed on any failure.
async fn write_field(field: &mut Field<'_>, path: &Path, max_bytes: usize) -> Result<usize, ApiError> {
    let result: Result<usize, ApiError> = async {
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| anyhow::anyhow!("create {}: {e}", path.display()))?;
        let mut written = 0usize;
        while let Some(chunk) = field.chunk().await? {
            written += chunk.len();
            if written > max_bytes {
                return Err(ApiError::PayloadTooLarge("File too large".into()));
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| anyhow::anyhow!("write {}: {e}", path.display()))?;
        }
        file.flush()
            .await
            .map_err(|e| anyhow::anyhow!("flush {}: {e}", path.display()))?;
        Ok(written)
    }
    .await;

    if result.is_err() {
        let _ = tokio::fs::remove_file(path).await;
    }
    result
}

async fn upload_video(
    State(state): State<AppState>,
    AuthorUser(user): AuthorUser,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let uploads = &state.config.uploads;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FIELD_NAME) {
            continue;
        }
        if !field.content_type().is_some_and(|ct| ct.starts_with("video/")) {
            return Err(ApiError::bad_request("Only video files are allowed"));
        }

        let dir: PathBuf = uploads.videos_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| anyhow::anyhow!("create {}: {e}", dir.display()))?;

        let name = stored_name(field.file_name())?;
        let size = write_field(&mut field, &dir.join(&name), uploads.max_video_bytes).await?;
        tracing::info!(user_id = user.id(), file = %name, size, "video uploaded");

        return Ok(Json(UploadResponse {
            url: format!("/uploads/videos/{name}"),
        }));
    }

    Err(ApiError::bad_request("No video file uploaded"))
}
