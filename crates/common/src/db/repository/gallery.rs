//! Media queries for the gallery and map filter

use super::{scoped_sample_ids, Repository};
use crate::config::StorageConfig;
use crate::db::models::*;
use crate::dto::*;
use crate::errors::Result;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;

impl Repository {
    pub async fn find_media(&self, id: i32) -> Result<Option<PhotoVideo>> {
        PhotoVideoEntity::find_by_id(id)
            .one(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Media whose sample lies inside the filter's station scope
    pub async fn list_media(&self, filter: &MediaFilter) -> Result<Vec<PhotoVideo>> {
        let scope = filter.scope();
        let mut query = PhotoVideoEntity::find();

        if !scope.is_unrestricted() {
            query = query.filter(PhotoVideoColumn::SampleId.in_subquery(scoped_sample_ids(&scope)));
        }
        if let Some(id) = filter.sample_id {
            query = query.filter(PhotoVideoColumn::SampleId.eq(id));
        }
        if let Some(ref media_type) = filter.media_type {
            query = query.filter(PhotoVideoColumn::MediaType.eq(media_type.as_str()));
        }

        query
            .order_by_asc(PhotoVideoColumn::Id)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }

    /// Media with sample, station, cruise and contractor lineage
    pub async fn gallery_items(
        &self,
        filter: &MediaFilter,
        storage: &StorageConfig,
    ) -> Result<Vec<GalleryItem>> {
        let media = self.list_media(filter).await?;

        let sample_ids: Vec<i32> = media.iter().map(|m| m.sample_id).collect();
        let samples: HashMap<i32, Sample> = self
            .rows_in::<SampleEntity>(SampleColumn::Id, &sample_ids, SampleColumn::Id)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let station_ids: Vec<i32> = samples.values().map(|s| s.station_id).collect();
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

        Ok(media
            .iter()
            .map(|m| {
                let sample = samples.get(&m.sample_id);
                let station = sample.and_then(|s| stations.get(&s.station_id));
                let cruise = station.and_then(|s| cruises.get(&s.cruise_id));
                let contractor = cruise.and_then(|c| contractors.get(&c.contractor_id));

                GalleryItem {
                    media: MediaDto::from_model(m, storage),
                    download_url: format!("/api/Gallery/{}/download", m.id),
                    sample_code: sample.map(|s| s.code.clone()),
                    station_id: station.map(|s| s.id),
                    station_code: station.map(|s| s.code.clone()),
                    cruise_id: cruise.map(|c| c.id),
                    cruise_name: cruise.map(|c| c.name.clone()),
                    contractor_id: contractor.map(|c| c.id),
                    contractor_name: contractor.map(|c| c.name.clone()),
                }
            })
            .collect())
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
    async fn test_gallery_for_contractor_six_traces_to_contractor_six() {
        let repo = repo().await;
        let filter = MediaFilter { contractor_id: Some(6), ..Default::default() };

        let items = repo.gallery_items(&filter, &StorageConfig::default()).await.unwrap();
        assert_eq!(items.iter().map(|i| i.media.id).collect::<Vec<_>>(), vec![4, 5, 6, 7]);
        assert!(items.iter().all(|i| i.contractor_id == Some(6)));
        assert_eq!(items[0].download_url, "/api/Gallery/4/download");
    }

    #[tokio::test]
    async fn test_media_filters_combine() {
        let repo = repo().await;

        let videos = repo
            .list_media(&MediaFilter { media_type: Some("Video".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(videos.iter().map(|m| m.id).collect::<Vec<_>>(), vec![3, 5]);

        let in_block = repo
            .list_media(&MediaFilter { block_id: Some(6), media_type: Some("Photo".into()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(in_block.iter().map(|m| m.id).collect::<Vec<_>>(), vec![4, 6]);

        let by_sample = repo
            .list_media(&MediaFilter { sample_id: Some(5), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_sample.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_media_is_none() {
        let repo = repo().await;
        assert!(repo.find_media(999).await.unwrap().is_none());
    }
}
