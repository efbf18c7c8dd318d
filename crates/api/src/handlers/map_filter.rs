//! Map filter handlers: lookups, per-level listings, map-data and facets

use crate::extract::{ApiPath, ApiQuery};
use crate::AppState;
use axum::{extract::State, Json};
use seabed_common::{
    catalog,
    db::Repository,
    dto::*,
    errors::{AppError, Result},
    export::geojson,
    metrics,
};
use serde_json::Value;
use std::time::Instant;

// ============================================================================
// Lookups
// ============================================================================

pub async fn contract_types(State(state): State<AppState>) -> Result<Json<Vec<LookupOption>>> {
    let repo = Repository::new(state.db.clone());
    let types = repo.contract_types().await?;
    Ok(Json(types.iter().map(LookupOption::from).collect()))
}

pub async fn contract_statuses(State(state): State<AppState>) -> Result<Json<Vec<LookupOption>>> {
    let repo = Repository::new(state.db.clone());
    let statuses = repo.contract_statuses().await?;
    Ok(Json(statuses.iter().map(LookupOption::from).collect()))
}

pub async fn sponsoring_states(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.sponsoring_states().await?))
}

pub async fn contractual_years(State(state): State<AppState>) -> Result<Json<Vec<i32>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.contractual_years().await?))
}

// ============================================================================
// Per-level listings
// ============================================================================

/// Contractors with nested areas and blocks
pub async fn contractors(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<MapDataFilter>,
) -> Result<Json<Vec<ContractorNode>>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.contractor_tree(&filter).await?))
}

pub async fn contractor_areas(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<AreaFilter>,
) -> Result<Json<Vec<AreaDto>>> {
    let repo = Repository::new(state.db.clone());
    let areas = repo.list_areas(&filter).await?;
    Ok(Json(areas.iter().map(AreaDto::from).collect()))
}

pub async fn contractor_area_blocks(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<BlockFilter>,
) -> Result<Json<Vec<BlockDto>>> {
    let repo = Repository::new(state.db.clone());
    let blocks = repo.list_blocks(&filter).await?;
    Ok(Json(blocks.iter().map(BlockDto::from).collect()))
}

pub async fn cruises(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<CruiseFilter>,
) -> Result<Json<Vec<CruiseDto>>> {
    let repo = Repository::new(state.db.clone());
    let cruises = repo.list_cruises(&filter).await?;
    Ok(Json(cruises.iter().map(CruiseDto::from).collect()))
}

pub async fn stations(
    State(state): State<AppState>,
    ApiQuery(scope): ApiQuery<StationScope>,
) -> Result<Json<Vec<StationDto>>> {
    let repo = Repository::new(state.db.clone());
    let stations = repo.list_stations(&scope).await?;
    Ok(Json(stations.iter().map(StationDto::from).collect()))
}

pub async fn samples(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<SampleFilter>,
) -> Result<Json<Vec<SampleDto>>> {
    let repo = Repository::new(state.db.clone());
    let samples = repo.list_samples(&filter).await?;
    Ok(Json(samples.iter().map(SampleDto::from).collect()))
}

pub async fn media(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<MediaFilter>,
) -> Result<Json<Vec<MediaDto>>> {
    let repo = Repository::new(state.db.clone());
    let media = repo.list_media(&filter).await?;
    Ok(Json(
        media
            .iter()
            .map(|m| MediaDto::from_model(m, &state.config.storage))
            .collect(),
    ))
}

// ============================================================================
// Aggregation
// ============================================================================

/// The nested map document
pub async fn map_data(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<MapDataFilter>,
) -> Result<Json<MapData>> {
    let start = Instant::now();
    let repo = Repository::new(state.db.clone());

    let rows = repo.load_catalog_rows(&filter).await?;
    let data = catalog::assemble_map_data(&rows, &state.config.storage);

    metrics::record_map_data(
        start.elapsed().as_secs_f64(),
        data.summary.contractors,
        data.summary.samples,
        !filter.is_empty(),
    );

    tracing::info!(
        contractors = data.summary.contractors,
        stations = data.summary.stations,
        samples = data.summary.samples,
        latency_ms = start.elapsed().as_millis() as u64,
        "Map data assembled"
    );

    Ok(Json(data))
}

pub async fn filter_options(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<MapDataFilter>,
    ApiQuery(active): ApiQuery<ActiveFacetQuery>,
) -> Result<Json<FilterOptions>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.filter_options(&filter, active.active_filter).await?))
}

// ============================================================================
// GeoJSON
// ============================================================================

/// One area as a GeoJSON Feature
pub async fn area_geojson(
    State(state): State<AppState>,
    ApiPath(area_id): ApiPath<i32>,
) -> Result<Json<Value>> {
    let repo = Repository::new(state.db.clone());
    let area = repo
        .find_area(area_id)
        .await?
        .ok_or(AppError::AreaNotFound { id: area_id })?;

    Ok(Json(geojson::area_feature(&AreaDto::from(&area))))
}

/// A contractor's areas as a FeatureCollection
pub async fn contractor_areas_geojson(
    State(state): State<AppState>,
    ApiPath(contractor_id): ApiPath<i32>,
) -> Result<Json<Value>> {
    let repo = Repository::new(state.db.clone());
    if repo.find_contractor(contractor_id).await?.is_none() {
        return Err(AppError::ContractorNotFound { id: contractor_id });
    }

    let areas = repo
        .list_areas(&AreaFilter { contractor_id: Some(contractor_id) })
        .await?;

    Ok(Json(geojson::feature_collection(
        areas
            .iter()
            .map(|a| geojson::area_feature(&AreaDto::from(a)))
            .collect(),
    )))
}
