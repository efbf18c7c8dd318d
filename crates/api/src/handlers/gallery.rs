//! Gallery handlers: media listing and blob download proxy

use crate::extract::{ApiPath, ApiQuery};
use crate::AppState;
use axum::{
    extract::State,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use seabed_common::{
    db::Repository,
    dto::{GalleryItem, MediaFilter},
    errors::{AppError, Result},
};
use tracing::warn;

/// `GET /Gallery/media`
pub async fn media(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<MediaFilter>,
) -> Result<Json<Vec<GalleryItem>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.gallery_items(&filter, &state.config.storage).await?))
}

/// `GET /Gallery/{mediaId}/download`
pub async fn download(
    State(state): State<AppState>,
    ApiPath(media_id): ApiPath<i32>,
) -> Result<Response> {
    let repo = Repository::new(state.db.clone());
    let media = repo
        .find_media(media_id)
        .await?
        .ok_or(AppError::MediaNotFound { id: media_id })?;

    let url = state.config.storage.media_url(&media.file_name);

    let upstream = state
        .http
        .get(&url)
        .timeout(state.config.storage.download_timeout())
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            warn!(media_id, url = %url, error = %e, "Blob fetch failed");
            AppError::Upstream {
                message: format!("Failed to fetch media {}: {}", media_id, e),
            }
        })?;

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

    let bytes = upstream.bytes().await.map_err(|e| AppError::Upstream {
        message: format!("Failed to read media {}: {}", media_id, e),
    })?;

    let disposition = HeaderValue::from_str(&attachment(&media.file_name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [(header::CONTENT_TYPE, content_type), (header::CONTENT_DISPOSITION, disposition)],
        bytes,
    )
        .into_response())
}

/// `attachment; filename="…"` with quotes and control characters stripped
fn attachment(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}
