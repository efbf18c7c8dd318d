//! Bundled seed catalog
//!
//! The catalog ships as JSON inside the binary and is loaded once, when the
//! contractor table is empty.

use super::models::*;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info};

const BUNDLED_CATALOG: &str = include_str!("../../seed/catalog.json");

/// Every seeded table, in insertion order
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedCatalog {
    #[serde(default)]
    pub contract_types: Vec<ContractType>,
    #[serde(default)]
    pub contract_statuses: Vec<ContractStatus>,
    #[serde(default)]
    pub contractors: Vec<Contractor>,
    #[serde(default)]
    pub areas: Vec<ContractorArea>,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default)]
    pub cruises: Vec<Cruise>,
    #[serde(default)]
    pub stations: Vec<Station>,
    #[serde(default)]
    pub samples: Vec<Sample>,
    #[serde(default)]
    pub ctd_data: Vec<CtdData>,
    #[serde(default)]
    pub env_results: Vec<EnvResult>,
    #[serde(default)]
    pub geo_results: Vec<GeoResult>,
    #[serde(default)]
    pub media: Vec<PhotoVideo>,
    #[serde(default)]
    pub library: Vec<LibraryDocument>,
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    #[serde(default)]
    pub valid_values: Vec<ValidValue>,
}

impl SeedCatalog {
    /// The catalog compiled into the crate
    pub fn bundled() -> Result<Self, serde_json::Error> {
        serde_json::from_str(BUNDLED_CATALOG)
    }

    pub fn row_count(&self) -> usize {
        self.contract_types.len()
            + self.contract_statuses.len()
            + self.contractors.len()
            + self.areas.len()
            + self.blocks.len()
            + self.cruises.len()
            + self.stations.len()
            + self.samples.len()
            + self.ctd_data.len()
            + self.env_results.len()
            + self.geo_results.len()
            + self.media.len()
            + self.library.len()
            + self.qualifiers.len()
            + self.valid_values.len()
    }
}

/// Bulk insert a table's rows, keeping their ids
macro_rules! insert_rows {
    ($db:expr, $entity:ty, $rows:expr) => {
        if !$rows.is_empty() {
            <$entity>::insert_many(
                $rows
                    .iter()
                    .cloned()
                    .map(|row| row.into_active_model().reset_all()),
            )
            .exec_without_returning($db)
            .await?;
        }
    };
}

/// Tables whose serial sequences must follow explicitly inserted ids
const SERIAL_TABLES: &[&str] = &[
    "contract_types",
    "contract_statuses",
    "contractors",
    "contractor_areas",
    "contractor_area_blocks",
    "cruises",
    "stations",
    "samples",
    "ctd_data",
    "env_results",
    "geo_results",
    "photo_videos",
    "library_documents",
    "qualifiers",
    "valid_values",
];

/// Load the catalog unless contractors already exist.
///
/// Returns the number of rows written (0 when the database was already seeded).
pub async fn seed_if_empty(db: &DatabaseConnection, catalog: &SeedCatalog) -> Result<usize, DbErr> {
    let existing = ContractorEntity::find().count(db).await?;
    if existing > 0 {
        debug!(contractors = existing, "Catalog already seeded, skipping");
        return Ok(0);
    }

    let txn = db.begin().await?;

    insert_rows!(&txn, ContractTypeEntity, catalog.contract_types);
    insert_rows!(&txn, ContractStatusEntity, catalog.contract_statuses);
    insert_rows!(&txn, ContractorEntity, catalog.contractors);
    insert_rows!(&txn, ContractorAreaEntity, catalog.areas);
    insert_rows!(&txn, BlockEntity, catalog.blocks);
    insert_rows!(&txn, CruiseEntity, catalog.cruises);
    insert_rows!(&txn, StationEntity, catalog.stations);

    // Row by row so the depth and CTD range hooks run
    for sample in &catalog.samples {
        sample.clone().into_active_model().reset_all().insert(&txn).await?;
    }
    for reading in &catalog.ctd_data {
        reading.clone().into_active_model().reset_all().insert(&txn).await?;
    }

    insert_rows!(&txn, EnvResultEntity, catalog.env_results);
    insert_rows!(&txn, GeoResultEntity, catalog.geo_results);
    insert_rows!(&txn, PhotoVideoEntity, catalog.media);
    insert_rows!(&txn, LibraryDocumentEntity, catalog.library);
    insert_rows!(&txn, QualifierEntity, catalog.qualifiers);
    insert_rows!(&txn, ValidValueEntity, catalog.valid_values);

    if txn.get_database_backend() == DbBackend::Postgres {
        for table in SERIAL_TABLES {
            txn.execute_unprepared(&format!(
                "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
                 COALESCE((SELECT MAX(id) FROM {table}), 1))"
            ))
            .await?;
        }
    }

    txn.commit().await?;

    let rows = catalog.row_count();
    info!(
        rows,
        contractors = catalog.contractors.len(),
        stations = catalog.stations.len(),
        samples = catalog.samples.len(),
        "Seed catalog loaded"
    );
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::{empty_pool, seeded_pool};

    #[test]
    fn test_bundled_catalog_parses() {
        let catalog = SeedCatalog::bundled().unwrap();
        assert_eq!(catalog.contractors.len(), 7);
        assert!(catalog.stations.iter().any(|s| s.block_id.is_none()));
        assert!(catalog
            .samples
            .iter()
            .all(|s| sample::validate_depth_range(s.depth_upper, s.depth_lower).is_ok()));
    }

    #[test]
    fn test_bundled_catalog_references_are_consistent() {
        let catalog = SeedCatalog::bundled().unwrap();
        let has = |ids: Vec<i32>, id: i32| ids.contains(&id);

        let contractor_ids: Vec<i32> = catalog.contractors.iter().map(|c| c.id).collect();
        let area_ids: Vec<i32> = catalog.areas.iter().map(|a| a.id).collect();
        let cruise_ids: Vec<i32> = catalog.cruises.iter().map(|c| c.id).collect();
        let station_ids: Vec<i32> = catalog.stations.iter().map(|s| s.id).collect();
        let sample_ids: Vec<i32> = catalog.samples.iter().map(|s| s.id).collect();

        assert!(catalog.areas.iter().all(|a| has(contractor_ids.clone(), a.contractor_id)));
        assert!(catalog.blocks.iter().all(|b| has(area_ids.clone(), b.area_id)));
        assert!(catalog.cruises.iter().all(|c| has(contractor_ids.clone(), c.contractor_id)));
        assert!(catalog.stations.iter().all(|s| has(cruise_ids.clone(), s.cruise_id)));
        assert!(catalog.samples.iter().all(|s| has(station_ids.clone(), s.station_id)));
        assert!(catalog.geo_results.iter().all(|r| has(sample_ids.clone(), r.sample_id)));
        assert!(catalog.env_results.iter().all(|r| has(sample_ids.clone(), r.sample_id)));
        assert!(catalog.media.iter().all(|m| has(sample_ids.clone(), m.sample_id)));
    }

    #[tokio::test]
    async fn test_seeding_runs_once() {
        let pool = empty_pool().await;
        let catalog = SeedCatalog::bundled().unwrap();

        let first = seed_if_empty(pool.write(), &catalog).await.unwrap();
        assert_eq!(first, catalog.row_count());

        let second = seed_if_empty(pool.write(), &catalog).await.unwrap();
        assert_eq!(second, 0);

        let contractors = ContractorEntity::find().count(pool.read()).await.unwrap();
        assert_eq!(contractors, 7);
    }

    #[tokio::test]
    async fn test_seeded_pool_has_tag_block() {
        let pool = seeded_pool().await;
        let block = BlockEntity::find_by_id(6).one(pool.read()).await.unwrap().unwrap();
        assert_eq!(block.name, "TAG Hydrothermal Field");
    }
}
