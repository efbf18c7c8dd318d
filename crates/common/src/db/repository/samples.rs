//! Sample listing and vocabulary lookups

use super::{scoped_station_ids, Repository};
use crate::db::models::*;
use crate::dto::*;
use crate::errors::Result;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait};
use std::collections::HashMap;

impl Repository {
    /// Samples matching the filter, ordered by id
    pub async fn list_samples(&self, filter: &SampleFilter) -> Result<Vec<Sample>> {
        let scope = filter.scope();
        let mut query = SampleEntity::find();

        if !scope.is_unrestricted() {
            query = query.filter(SampleColumn::StationId.in_subquery(scoped_station_ids(&scope)));
        }
        if let Some(ref value) = filter.sample_type {
            query = query.filter(SampleColumn::SampleType.eq(value.as_str()));
        }
        if let Some(ref value) = filter.matrix_type {
            query = query.filter(SampleColumn::MatrixType.eq(value.as_str()));
        }
        if let Some(ref value) = filter.habitat_type {
            query = query.filter(SampleColumn::HabitatType.eq(value.as_str()));
        }
        if let Some(ref value) = filter.analysis {
            query = query.filter(SampleColumn::Analysis.eq(value.as_str()));
        }

        query
            .order_by_asc(SampleColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Samples with station, cruise and contractor names attached
    pub async fn sample_listing(&self, filter: &SampleFilter) -> Result<Vec<SampleListItem>> {
        let samples = self.list_samples(filter).await?;

        let station_ids: Vec<i32> = samples.iter().map(|s| s.station_id).collect();
        let stations: HashMap<i32, Station> = self
            .rows_in::<StationEntity>(StationColumn::Id, &station_ids, StationColumn::Id)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let cruise_ids: Vec<i32> = stations.values().map(|s| s.cruise_id).collect();
        let cruises: HashMap<i32, Cruise> = self
            .rows_in::<CruiseEntity>(CruiseColumn::Id, &cruise_ids, CruiseColumn::Id)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let contractor_ids: Vec<i32> = cruises.values().map(|c| c.contractor_id).collect();
        let contractors: HashMap<i32, Contractor> = self
            .rows_in::<ContractorEntity>(ContractorColumn::Id, &contractor_ids, ContractorColumn::Id)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(samples
            .iter()
            .map(|sample| {
                let station = stations.get(&sample.station_id);
                let cruise = station.and_then(|s| cruises.get(&s.cruise_id));
                let contractor = cruise.and_then(|c| contractors.get(&c.contractor_id));

                SampleListItem {
                    sample: SampleDto::from(sample),
                    station_code: station.map(|s| s.code.clone()),
                    cruise_id: cruise.map(|c| c.id),
                    cruise_name: cruise.map(|c| c.name.clone()),
                    contractor_id: contractor.map(|c| c.id),
                    contractor_name: contractor.map(|c| c.name.clone()),
                }
            })
            .collect())
    }

    /// Distinct non-null values of a sample text column, alphabetical
    async fn distinct_sample_values(&self, column: SampleColumn) -> Result<Vec<String>> {
        SampleEntity::find()
            .select_only()
            .column(column)
            .distinct()
            .filter(column.is_not_null())
            .order_by_asc(column)
            .into_tuple::<String>()
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    pub async fn sample_types(&self) -> Result<Vec<String>> {
        self.distinct_sample_values(SampleColumn::SampleType).await
    }

    pub async fn matrix_types(&self) -> Result<Vec<String>> {
        self.distinct_sample_values(SampleColumn::MatrixType).await
    }

    pub async fn habitat_types(&self) -> Result<Vec<String>> {
        self.distinct_sample_values(SampleColumn::HabitatType).await
    }

    pub async fn analyses(&self) -> Result<Vec<String>> {
        self.distinct_sample_values(SampleColumn::Analysis).await
    }

    /// Stations that have at least one sample
    pub async fn sample_stations(&self) -> Result<Vec<StationOption>> {
        let stations = StationEntity::find()
            .filter(
                StationColumn::Id.in_subquery(
                    SampleEntity::find()
                        .select_only()
                        .column(SampleColumn::StationId)
                        .into_query(),
                ),
            )
            .order_by_asc(StationColumn::Code)
            .all(self.read_conn())
            .await?;

        Ok(stations
            .into_iter()
            .map(|s| StationOption { id: s.id, code: s.code, cruise_id: s.cruise_id })
            .collect())
    }

    /// Cruises that have at least one sample
    pub async fn sample_cruises(&self) -> Result<Vec<LookupOption>> {
        let cruises = CruiseEntity::find()
            .filter(
                CruiseColumn::Id.in_subquery(
                    StationEntity::find()
                        .select_only()
                        .column(StationColumn::CruiseId)
                        .inner_join(SampleEntity)
                        .into_query(),
                ),
            )
            .order_by_asc(CruiseColumn::Name)
            .all(self.read_conn())
            .await?;

        Ok(cruises.iter().map(LookupOption::from).collect())
    }

    /// Contractors that have at least one sample
    pub async fn sample_contractors(&self) -> Result<Vec<LookupOption>> {
        let contractors = ContractorEntity::find()
            .filter(
                ContractorColumn::Id.in_subquery(
                    CruiseEntity::find()
                        .select_only()
                        .column(CruiseColumn::ContractorId)
                        .filter(
                            CruiseColumn::Id.in_subquery(
                                StationEntity::find()
                                    .select_only()
                                    .column(StationColumn::CruiseId)
                                    .inner_join(SampleEntity)
                                    .into_query(),
                            ),
                        )
                        .into_query(),
                ),
            )
            .order_by_asc(ContractorColumn::Name)
            .all(self.read_conn())
            .await?;

        Ok(contractors.iter().map(LookupOption::from).collect())
    }

    pub async fn qualifiers(&self) -> Result<Vec<Qualifier>> {
        QualifierEntity::find()
            .order_by_asc(QualifierColumn::Code)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    pub async fn valid_values(&self, field: Option<&str>) -> Result<Vec<ValidValue>> {
        let mut query = ValidValueEntity::find();
        if let Some(field) = field {
            query = query.filter(ValidValueColumn::Field.eq(field));
        }

        query
            .order_by_asc(ValidValueColumn::Field)
            .order_by_asc(ValidValueColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
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
    async fn test_sample_listing_carries_lineage() {
        let repo = repo().await;
        let filter = SampleFilter { contractor_id: Some(6), sample_type: Some("Sulphide".into()), ..Default::default() };

        let items = repo.sample_listing(&filter).await.unwrap();
        assert_eq!(items.iter().map(|i| i.sample.id).collect::<Vec<_>>(), vec![10, 12, 13, 14]);
        assert!(items.iter().all(|i| i.contractor_id == Some(6)));
        assert_eq!(items[0].station_code.as_deref(), Some("TAG-ST01"));
        assert_eq!(items[0].cruise_name.as_deref(), Some("LOG-37"));
    }

    #[tokio::test]
    async fn test_vocabulary_lookups() {
        let repo = repo().await;
        assert_eq!(
            repo.sample_types().await.unwrap(),
            vec!["Biology", "Nodule", "Sediment", "Sulphide", "Water"]
        );
        assert!(repo.analyses().await.unwrap().contains(&"Copper".to_string()));
        assert_eq!(repo.qualifiers().await.unwrap().len(), 4);
        assert_eq!(repo.valid_values(Some("media_type")).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_sample_contractors_are_those_with_samples() {
        let repo = repo().await;
        let contractors = repo.sample_contractors().await.unwrap();
        assert_eq!(contractors.len(), 7);

        let stations = repo.sample_stations().await.unwrap();
        // IOM-ST02 has no samples
        assert!(stations.iter().all(|s| s.code != "IOM-ST02"));
    }
}
