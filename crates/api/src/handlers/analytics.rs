//! Analytics handlers

use crate::extract::ApiPath;
use crate::AppState;
use axum::{extract::State, Json};
use seabed_common::{
    cache::keys,
    db::Repository,
    dto::{AssociationReport, BlockAnalytics, ContractorSummary},
    errors::Result,
};

/// `GET /Analytics/block/{blockId}`
pub async fn block_analytics(
    State(state): State<AppState>,
    ApiPath(block_id): ApiPath<i32>,
) -> Result<Json<BlockAnalytics>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.block_analytics(block_id).await?))
}

/// `GET /Analytics/contractor/{contractorId}/summary`, read through the cache when one is configured
pub async fn contractor_summary(
    State(state): State<AppState>,
    ApiPath(contractor_id): ApiPath<i32>,
) -> Result<Json<ContractorSummary>> {
    let repo = Repository::new(state.db.clone());

    let summary = match state.cache {
        Some(ref cache) => {
            cache
                .get_or_load(
                    &keys::contractor_summary(contractor_id),
                    "contractor_summary",
                    || repo.contractor_summary(contractor_id),
                )
                .await?
        }
        None => repo.contractor_summary(contractor_id).await?,
    };

    Ok(Json(summary))
}

/// `POST /Analytics/associate-stations-blocks`
pub async fn associate_stations_blocks(State(state): State<AppState>) -> Result<Json<AssociationReport>> {
    let repo = Repository::new(state.db.clone());
    Ok(Json(repo.associate_stations_blocks().await?))
}
