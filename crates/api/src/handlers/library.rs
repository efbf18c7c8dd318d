//! Library handlers

use crate::extract::{ApiQuery, ValidatedJson};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use seabed_common::{
    db::Repository,
    dto::{LibraryFilter, LibraryItem, LibraryUploadRequest, LookupOption},
    errors::Result,
};

/// `GET /Library/list`
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<LibraryFilter>,
) -> Result<Json<Vec<LibraryItem>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.list_library(&filter, &state.config.storage).await?))
}

/// `POST /Library/upload`: records document metadata, the file itself goes straight to blob storage
pub async fn upload(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LibraryUploadRequest>,
) -> Result<(StatusCode, Json<LibraryItem>)> {
    let repo = Repository::new(state.db.clone());
    let item = repo.create_library_document(&request, &state.config.storage).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn contractors(State(state): State<AppState>) -> Result<Json<Vec<LookupOption>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.library_contractors().await?))
}

pub async fn themes(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.library_themes().await?))
}
