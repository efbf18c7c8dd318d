//! Rollup inputs and the station/block association job

use super::Repository;
use crate::catalog::{plan_associations, BlockRows, ContractorRows};
use crate::db::models::*;
use crate::dto::*;
use crate::errors::{AppError, Result};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use std::time::Instant;
use tracing::{info, warn};

impl Repository {
    // ========================================================================
    // Contractor summary
    // ========================================================================

    /// Everything beneath a contractor, loaded level by level
    pub async fn contractor_rows(&self, contractor_id: i32) -> Result<ContractorRows> {
        let contractor = self
            .find_contractor(contractor_id)
            .await?
            .ok_or(AppError::ContractorNotFound { id: contractor_id })?;

        let areas = ContractorAreaEntity::find()
            .filter(ContractorAreaColumn::ContractorId.eq(contractor_id))
            .order_by_asc(ContractorAreaColumn::Id)
            .all(self.read_conn())
            .await?;
        let area_ids: Vec<i32> = areas.iter().map(|a| a.id).collect();
        let blocks = self
            .rows_in::<BlockEntity>(BlockColumn::AreaId, &area_ids, BlockColumn::Id)
            .await?;

        let cruises = CruiseEntity::find()
            .filter(CruiseColumn::ContractorId.eq(contractor_id))
            .order_by_asc(CruiseColumn::Id)
            .all(self.read_conn())
            .await?;
        let cruise_ids: Vec<i32> = cruises.iter().map(|c| c.id).collect();
        let stations = self
            .rows_in::<StationEntity>(StationColumn::CruiseId, &cruise_ids, StationColumn::Id)
            .await?;
        let station_ids: Vec<i32> = stations.iter().map(|s| s.id).collect();
        let samples = self
            .rows_in::<SampleEntity>(SampleColumn::StationId, &station_ids, SampleColumn::Id)
            .await?;

        Ok(ContractorRows { contractor, areas, blocks, cruises, stations, samples })
    }

    pub async fn contractor_summary(&self, contractor_id: i32) -> Result<ContractorSummary> {
        let rows = self.contractor_rows(contractor_id).await?;
        Ok(crate::catalog::contractor_summary(&rows))
    }

    // ========================================================================
    // Block analytics
    // ========================================================================

    /// A block with its stations and everything measured at them
    pub async fn block_rows(&self, block_id: i32) -> Result<BlockRows> {
        let block = BlockEntity::find_by_id(block_id)
            .one(self.read_conn())
            .await?
            .ok_or(AppError::BlockNotFound { id: block_id })?;

        let area = self.find_area(block.area_id).await?;
        let contractor = match area {
            Some(ref area) => self.find_contractor(area.contractor_id).await?,
            None => None,
        };

        let stations = StationEntity::find()
            .filter(StationColumn::BlockId.eq(block_id))
            .order_by_asc(StationColumn::Id)
            .all(self.read_conn())
            .await?;
        let station_ids: Vec<i32> = stations.iter().map(|s| s.id).collect();
        let samples = self
            .rows_in::<SampleEntity>(SampleColumn::StationId, &station_ids, SampleColumn::Id)
            .await?;
        let sample_ids: Vec<i32> = samples.iter().map(|s| s.id).collect();

        let env_results = self
            .rows_in::<EnvResultEntity>(EnvResultColumn::SampleId, &sample_ids, EnvResultColumn::Id)
            .await?;
        let geo_results = self
            .rows_in::<GeoResultEntity>(GeoResultColumn::SampleId, &sample_ids, GeoResultColumn::Id)
            .await?;
        let media = self
            .rows_in::<PhotoVideoEntity>(PhotoVideoColumn::SampleId, &sample_ids, PhotoVideoColumn::Id)
            .await?;

        Ok(BlockRows { block, area, contractor, stations, samples, env_results, geo_results, media })
    }

    pub async fn block_analytics(&self, block_id: i32) -> Result<BlockAnalytics> {
        let rows = self.block_rows(block_id).await?;
        Ok(crate::catalog::block_analytics(&rows))
    }

    // ========================================================================
    // Station/block association
    // ========================================================================

    /// Assign every unassigned station to the block containing it.
    ///
    /// Stations that already carry a block are never touched, so the job
    /// can be re-run safely.
    pub async fn associate_stations_blocks(&self) -> Result<AssociationReport> {
        let start = Instant::now();

        let stations = StationEntity::find()
            .filter(StationColumn::BlockId.is_null())
            .order_by_asc(StationColumn::Id)
            .all(self.write_conn())
            .await?;
        let blocks = BlockEntity::find()
            .order_by_asc(BlockColumn::Id)
            .all(self.write_conn())
            .await?;

        let mut report = plan_associations(&stations, &blocks);

        for ambiguous in &report.ambiguous {
            warn!(
                station_id = ambiguous.station_id,
                candidates = ?ambiguous.candidate_block_ids,
                "Station falls inside several blocks; keeping the lowest block id"
            );
        }

        let txn = self.write_conn().begin().await?;
        let mut applied = Vec::with_capacity(report.assignments.len());

        for assignment in report.assignments.drain(..) {
            let result = StationEntity::update_many()
                .col_expr(StationColumn::BlockId, Expr::value(assignment.block_id))
                .filter(StationColumn::Id.eq(assignment.station_id))
                .filter(StationColumn::BlockId.is_null())
                .exec(&txn)
                .await?;

            // Assigned concurrently since the scan
            if result.rows_affected == 0 {
                continue;
            }
            applied.push(assignment);
        }

        txn.commit().await?;

        report.assigned = applied.len();
        report.assignments = applied;

        crate::metrics::record_association(
            start.elapsed().as_secs_f64(),
            report.assigned,
            report.unmatched,
        );

        info!(
            scanned = report.scanned,
            assigned = report.assigned,
            unmatched = report.unmatched,
            ambiguous = report.ambiguous.len(),
            "Station association complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::seeded_pool;

    async fn repo() -> Repository {
        Repository::new(seeded_pool().await)
    }

    #[tokio::test]
    async fn test_block_six_reports_copper_grade() {
        let repo = repo().await;
        let analytics = repo.block_analytics(6).await.unwrap();

        assert_eq!(analytics.block_name, "TAG Hydrothermal Field");
        assert!(analytics.counts.stations >= 1);
        assert_eq!(analytics.contractor_id, Some(6));

        let copper = analytics
            .resource_metrics
            .iter()
            .find(|m| m.name == "Copper")
            .unwrap();
        assert_eq!(copper.value, 15.8);
        assert_eq!(copper.count, 1);
    }

    #[tokio::test]
    async fn test_missing_block_and_contractor() {
        let repo = repo().await;
        assert!(matches!(
            repo.block_analytics(404).await.unwrap_err(),
            AppError::BlockNotFound { id: 404 }
        ));
        assert!(matches!(
            repo.contractor_summary(404).await.unwrap_err(),
            AppError::ContractorNotFound { id: 404 }
        ));
    }

    #[tokio::test]
    async fn test_contractor_totals_match_block_sizes() {
        let repo = repo().await;
        for id in 1..=7 {
            let rows = repo.contractor_rows(id).await.unwrap();
            let summary = crate::catalog::contractor_summary(&rows);

            let blocks: f64 = rows.blocks.iter().map(|b| b.area_size_km2).sum();
            let by_area: f64 = summary.areas.iter().map(|a| a.total_area_km2).sum();
            assert!((summary.total_area_km2 - blocks).abs() < 1e-9);
            assert!((summary.total_area_km2 - by_area).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_contractor_two_summary() {
        let repo = repo().await;
        let summary = repo.contractor_summary(2).await.unwrap();
        assert_eq!(
            summary.contractor_name,
            "China Ocean Mineral Resources Research and Development Association"
        );
        assert_eq!(summary.counts.areas, 1);
        assert!(summary.counts.cruises >= 1);
        assert!(summary.earliest_cruise_date <= summary.latest_cruise_date);
    }

    #[tokio::test]
    async fn test_association_assigns_once() {
        let repo = repo().await;

        let first = repo.associate_stations_blocks().await.unwrap();
        assert_eq!(first.scanned, 5);
        assert_eq!(first.assigned, 4);
        assert_eq!(first.unmatched, 1);
        assert!(first.ambiguous.is_empty());

        let assigned: Vec<(i32, i32)> = first
            .assignments
            .iter()
            .map(|a| (a.station_id, a.block_id))
            .collect();
        assert_eq!(assigned, vec![(2, 1), (11, 6), (12, 7), (14, 8)]);

        let second = repo.associate_stations_blocks().await.unwrap();
        assert_eq!(second.scanned, 1);
        assert_eq!(second.assigned, 0);
        assert_eq!(second.unmatched, 1);

        let block_six = repo.block_analytics(6).await.unwrap();
        assert_eq!(block_six.counts.stations, 3);
    }
}
