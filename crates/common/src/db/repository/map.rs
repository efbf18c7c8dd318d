//! Map filter lookups and the staged map-data load

use super::{scoped_stations, Repository};
use crate::catalog::{self, CatalogRows};
use crate::db::models::*;
use crate::dto::*;
use crate::errors::Result;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::debug;

impl Repository {
    // ========================================================================
    // Lookups
    // ========================================================================

    pub async fn contract_types(&self) -> Result<Vec<ContractType>> {
        ContractTypeEntity::find()
            .order_by_asc(ContractTypeColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    pub async fn contract_statuses(&self) -> Result<Vec<ContractStatus>> {
        ContractStatusEntity::find()
            .order_by_asc(ContractStatusColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Distinct sponsoring states, alphabetical
    pub async fn sponsoring_states(&self) -> Result<Vec<String>> {
        ContractorEntity::find()
            .select_only()
            .column(ContractorColumn::SponsoringState)
            .distinct()
            .order_by_asc(ContractorColumn::SponsoringState)
            .into_tuple::<String>()
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Distinct contractual years, ascending
    pub async fn contractual_years(&self) -> Result<Vec<i32>> {
        ContractorEntity::find()
            .select_only()
            .column(ContractorColumn::ContractualYear)
            .distinct()
            .order_by_asc(ContractorColumn::ContractualYear)
            .into_tuple::<i32>()
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Contractors, areas, blocks
    // ========================================================================

    pub async fn find_contractor(&self, id: i32) -> Result<Option<Contractor>> {
        ContractorEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Contractors matching the map filter's equality filters
    pub async fn find_contractors(&self, filter: &MapDataFilter) -> Result<Vec<Contractor>> {
        let mut query = ContractorEntity::find();

        if let Some(id) = filter.contractor_id {
            query = query.filter(ContractorColumn::Id.eq(id));
        }
        if let Some(id) = filter.contract_type_id {
            query = query.filter(ContractorColumn::ContractTypeId.eq(id));
        }
        if let Some(id) = filter.contract_status_id {
            query = query.filter(ContractorColumn::ContractStatusId.eq(id));
        }
        if let Some(ref state) = filter.sponsoring_state {
            query = query.filter(ContractorColumn::SponsoringState.eq(state.as_str()));
        }
        if let Some(year) = filter.year {
            query = query.filter(ContractorColumn::ContractualYear.eq(year));
        }

        query
            .order_by_asc(ContractorColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Contractors with their areas and blocks nested
    pub async fn contractor_tree(&self, filter: &MapDataFilter) -> Result<Vec<ContractorNode>> {
        let contractors = self.find_contractors(filter).await?;
        let contractor_ids: Vec<i32> = contractors.iter().map(|c| c.id).collect();

        let areas = self
            .rows_in::<ContractorAreaEntity>(ContractorAreaColumn::ContractorId, &contractor_ids, ContractorAreaColumn::Id)
            .await?;
        let area_ids: Vec<i32> = areas.iter().map(|a| a.id).collect();
        let blocks = self
            .rows_in::<BlockEntity>(BlockColumn::AreaId, &area_ids, BlockColumn::Id)
            .await?;

        Ok(catalog::contractor_nodes(
            &contractors,
            &areas,
            &blocks,
            &self.contract_types().await?,
            &self.contract_statuses().await?,
        ))
    }

    pub async fn find_area(&self, id: i32) -> Result<Option<ContractorArea>> {
        ContractorAreaEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    pub async fn list_areas(&self, filter: &AreaFilter) -> Result<Vec<ContractorArea>> {
        let mut query = ContractorAreaEntity::find();
        if let Some(id) = filter.contractor_id {
            query = query.filter(ContractorAreaColumn::ContractorId.eq(id));
        }

        query
            .order_by_asc(ContractorAreaColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    pub async fn list_blocks(&self, filter: &BlockFilter) -> Result<Vec<Block>> {
        let mut query = BlockEntity::find();
        if let Some(id) = filter.area_id {
            query = query.filter(BlockColumn::AreaId.eq(id));
        }
        if let Some(id) = filter.contractor_id {
            query = query
                .inner_join(ContractorAreaEntity)
                .filter(ContractorAreaColumn::ContractorId.eq(id));
        }

        query
            .order_by_asc(BlockColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Cruises and stations
    // ========================================================================

    pub async fn list_cruises(&self, filter: &CruiseFilter) -> Result<Vec<Cruise>> {
        let mut query = CruiseEntity::find();
        if let Some(id) = filter.contractor_id {
            query = query.filter(CruiseColumn::ContractorId.eq(id));
        }
        if let Some(id) = filter.cruise_id {
            query = query.filter(CruiseColumn::Id.eq(id));
        }

        query
            .order_by_asc(CruiseColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    pub async fn list_stations(&self, scope: &StationScope) -> Result<Vec<Station>> {
        scoped_stations(scope)
            .order_by_asc(StationColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Map data
    // ========================================================================

    /// Staged load of everything a map-data filter reaches.
    ///
    /// Contractors first, then areas/blocks and cruises for them, then
    /// stations, their CTD readings and samples, then sample children.
    pub async fn load_catalog_rows(&self, filter: &MapDataFilter) -> Result<CatalogRows> {
        let contractors = self.find_contractors(filter).await?;
        let contractor_ids: Vec<i32> = contractors.iter().map(|c| c.id).collect();

        let areas = self
            .rows_in::<ContractorAreaEntity>(ContractorAreaColumn::ContractorId, &contractor_ids, ContractorAreaColumn::Id)
            .await?;
        let area_ids: Vec<i32> = areas.iter().map(|a| a.id).collect();
        let blocks = self
            .rows_in::<BlockEntity>(BlockColumn::AreaId, &area_ids, BlockColumn::Id)
            .await?;

        let mut cruises = self
            .rows_in::<CruiseEntity>(CruiseColumn::ContractorId, &contractor_ids, CruiseColumn::Id)
            .await?;
        if let Some(cruise_id) = filter.cruise_id {
            cruises.retain(|c| c.id == cruise_id);
        }
        let cruise_ids: Vec<i32> = cruises.iter().map(|c| c.id).collect();

        let stations = self
            .rows_in::<StationEntity>(StationColumn::CruiseId, &cruise_ids, StationColumn::Id)
            .await?;
        let station_ids: Vec<i32> = stations.iter().map(|s| s.id).collect();

        let ctd_data = self
            .rows_in::<CtdDataEntity>(CtdDataColumn::StationId, &station_ids, CtdDataColumn::Id)
            .await?;
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

        debug!(
            contractors = contractors.len(),
            cruises = cruises.len(),
            stations = stations.len(),
            samples = samples.len(),
            "Catalog rows loaded"
        );

        Ok(CatalogRows {
            contract_types: self.contract_types().await?,
            contract_statuses: self.contract_statuses().await?,
            contractors,
            areas,
            blocks,
            cruises,
            stations,
            ctd_data,
            samples,
            env_results,
            geo_results,
            media,
        })
    }

    // ========================================================================
    // Facets
    // ========================================================================

    /// Options still reachable under `filter`; `active` keeps its full list
    pub async fn filter_options(
        &self,
        filter: &MapDataFilter,
        active: Option<FacetKey>,
    ) -> Result<FilterOptions> {
        let contractors = self.find_contractors(&MapDataFilter::default()).await?;
        let cruises = self.list_cruises(&CruiseFilter::default()).await?;

        let full = FilterOptions {
            contractors: contractors.iter().map(LookupOption::from).collect(),
            contract_types: self.contract_types().await?.iter().map(LookupOption::from).collect(),
            contract_statuses: self.contract_statuses().await?.iter().map(LookupOption::from).collect(),
            sponsoring_states: self.sponsoring_states().await?,
            contractual_years: self.contractual_years().await?,
            cruises: cruises.iter().map(LookupOption::from).collect(),
        };

        let rows = catalog::facet_rows(&contractors, &cruises);
        Ok(catalog::available_options(&rows, &full, filter, active))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;
    use crate::db::testing::seeded_pool;

    async fn repo() -> Repository {
        Repository::new(seeded_pool().await)
    }

    #[tokio::test]
    async fn test_contractor_two_has_area_two_and_block_two() {
        let repo = repo().await;
        let filter = MapDataFilter { contractor_id: Some(2), ..Default::default() };

        let tree = repo.contractor_tree(&filter).await.unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(
            tree[0].contractor.name,
            "China Ocean Mineral Resources Research and Development Association"
        );
        assert_eq!(tree[0].areas.len(), 1);
        assert_eq!(tree[0].areas[0].area.id, 2);
        assert_eq!(tree[0].areas[0].blocks.iter().map(|b| b.id).collect::<Vec<_>>(), vec![2]);
    }

    #[tokio::test]
    async fn test_lookup_lists() {
        let repo = repo().await;
        assert_eq!(repo.contract_types().await.unwrap().len(), 3);
        assert_eq!(repo.contractual_years().await.unwrap(), vec![2001, 2002, 2006, 2012]);

        let states = repo.sponsoring_states().await.unwrap();
        assert!(states.windows(2).all(|w| w[0] < w[1]));
        assert!(states.contains(&"China".to_string()));
    }

    #[tokio::test]
    async fn test_blocks_filtered_by_contractor() {
        let repo = repo().await;
        let blocks = repo
            .list_blocks(&BlockFilter { contractor_id: Some(6), area_id: None })
            .await
            .unwrap();
        assert_eq!(blocks.iter().map(|b| b.id).collect::<Vec<_>>(), vec![6, 7]);
    }

    #[tokio::test]
    async fn test_map_data_scoped_to_cruise_within_contractors() {
        let repo = repo().await;

        let filter = MapDataFilter { contractor_id: Some(2), cruise_id: Some(3), ..Default::default() };
        let rows = repo.load_catalog_rows(&filter).await.unwrap();
        assert_eq!(rows.cruises.iter().map(|c| c.id).collect::<Vec<_>>(), vec![3]);
        assert!(rows.stations.iter().all(|s| s.cruise_id == 3));

        // A cruise outside the matched contractors yields no cruises
        let filter = MapDataFilter { contractor_id: Some(2), cruise_id: Some(7), ..Default::default() };
        let rows = repo.load_catalog_rows(&filter).await.unwrap();
        assert!(rows.cruises.is_empty());
        assert!(rows.samples.is_empty());
        assert_eq!(rows.contractors.len(), 1);
    }

    #[tokio::test]
    async fn test_unfiltered_map_data_holds_the_whole_catalog() {
        let repo = repo().await;
        let rows = repo.load_catalog_rows(&MapDataFilter::default()).await.unwrap();
        let doc = catalog::assemble_map_data(&rows, &StorageConfig::default());

        assert_eq!(doc.summary.contractors, 7);
        assert_eq!(doc.summary.blocks, 8);
        assert_eq!(doc.summary.stations, 14);
        assert_eq!(doc.summary.samples, 16);
        assert_eq!(doc.summary.media, 8);
    }

    #[tokio::test]
    async fn test_filter_options_follow_selection() {
        let repo = repo().await;
        let filter = MapDataFilter { contract_type_id: Some(2), ..Default::default() };

        let options = repo.filter_options(&filter, None).await.unwrap();
        assert_eq!(options.contractors.iter().map(|c| c.id).collect::<Vec<_>>(), vec![6]);
        assert_eq!(options.cruises.iter().map(|c| c.id).collect::<Vec<_>>(), vec![7, 8]);
        assert_eq!(options.contractual_years, vec![2012]);

        let options = repo
            .filter_options(&filter, Some(FacetKey::ContractTypeId))
            .await
            .unwrap();
        assert_eq!(options.contract_types.len(), 3);
    }
}
