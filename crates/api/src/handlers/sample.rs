//! Sample handlers

use crate::extract::ApiQuery;
use crate::AppState;
use axum::{extract::State, Json};
use seabed_common::{
    db::Repository,
    dto::{LookupOption, QualifierDto, SampleFilter, SampleListItem, StationOption, ValidValueDto, ValidValueQuery},
    errors::Result,
};

pub async fn list(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<SampleFilter>,
) -> Result<Json<Vec<SampleListItem>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.sample_listing(&filter).await?))
}

pub async fn sample_types(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.sample_types().await?))
}

pub async fn matrix_types(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.matrix_types().await?))
}

pub async fn habitat_types(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.habitat_types().await?))
}

pub async fn analyses(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.analyses().await?))
}

/// Stations with at least one sample
pub async fn stations(State(state): State<AppState>) -> Result<Json<Vec<StationOption>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.sample_stations().await?))
}

pub async fn cruises(State(state): State<AppState>) -> Result<Json<Vec<LookupOption>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.sample_cruises().await?))
}

pub async fn contractors(State(state): State<AppState>) -> Result<Json<Vec<LookupOption>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.sample_contractors().await?))
}

pub async fn qualifiers(State(state): State<AppState>) -> Result<Json<Vec<QualifierDto>>> {
    let repo = Repository::new(state.db.clone());
    let qualifiers = repo.qualifiers().await?;
    Ok(Json(qualifiers.into_iter().map(QualifierDto::from).collect()))
}

pub async fn valid_values(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ValidValueQuery>,
) -> Result<Json<Vec<ValidValueDto>>> {
    let repo = Repository::new(state.db.clone());
    let values = repo.valid_values(query.field.as_deref()).await?;
    Ok(Json(values.into_iter().map(ValidValueDto::from).collect()))
}
