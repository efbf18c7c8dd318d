//! Schema bootstrap from the entity definitions
//!
//! Tables are created parents first with `IF NOT EXISTS`, so running this on
//! every startup is safe.

use super::models::*;
use sea_orm::sea_query::{Expr, Index, IndexCreateStatement, SimpleExpr, TableCreateStatement};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Schema};
use tracing::{debug, info};

fn table<E: EntityTrait>(schema: &Schema, entity: E) -> TableCreateStatement {
    schema.create_table_from_entity(entity).if_not_exists().to_owned()
}

/// `column IS NULL OR column BETWEEN min AND max`
fn optional_between<C>(column: C, (min, max): (f64, f64)) -> SimpleExpr
where
    C: sea_orm::sea_query::IntoColumnRef + Copy,
{
    Expr::col(column).is_null().or(Expr::col(column).between(min, max))
}

fn tables(schema: &Schema) -> Vec<TableCreateStatement> {
    use super::models::{ctd_data, sample};

    let samples = table(schema, SampleEntity)
        .check(Expr::col(sample::Column::DepthUpper).gt(Expr::col(sample::Column::DepthLower)))
        .to_owned();

    let ctd = table(schema, CtdDataEntity)
        .check(optional_between(ctd_data::Column::TemperatureC, ctd_data::TEMPERATURE_RANGE_C))
        .check(optional_between(ctd_data::Column::SalinityPsu, ctd_data::SALINITY_RANGE_PSU))
        .check(optional_between(ctd_data::Column::OxygenUmolKg, ctd_data::OXYGEN_RANGE_UMOL_KG))
        .check(optional_between(ctd_data::Column::Ph, ctd_data::PH_RANGE))
        .to_owned();

    vec![
        table(schema, ContractTypeEntity),
        table(schema, ContractStatusEntity),
        table(schema, ContractorEntity),
        table(schema, ContractorAreaEntity),
        table(schema, BlockEntity),
        table(schema, CruiseEntity),
        table(schema, StationEntity),
        samples,
        ctd,
        table(schema, EnvResultEntity),
        table(schema, GeoResultEntity),
        table(schema, PhotoVideoEntity),
        table(schema, LibraryDocumentEntity),
        table(schema, QualifierEntity),
        table(schema, ValidValueEntity),
    ]
}

fn foreign_key_index<E, C>(name: &str, entity: E, column: C) -> IndexCreateStatement
where
    E: EntityTrait,
    C: sea_orm::sea_query::IntoIden,
{
    Index::create()
        .if_not_exists()
        .name(name)
        .table(entity)
        .col(column)
        .to_owned()
}

fn indexes() -> Vec<IndexCreateStatement> {
    vec![
        foreign_key_index("idx_contractors_contract_type_id", ContractorEntity, ContractorColumn::ContractTypeId),
        foreign_key_index("idx_contractors_contract_status_id", ContractorEntity, ContractorColumn::ContractStatusId),
        foreign_key_index("idx_contractor_areas_contractor_id", ContractorAreaEntity, ContractorAreaColumn::ContractorId),
        foreign_key_index("idx_contractor_area_blocks_area_id", BlockEntity, BlockColumn::AreaId),
        foreign_key_index("idx_cruises_contractor_id", CruiseEntity, CruiseColumn::ContractorId),
        foreign_key_index("idx_stations_cruise_id", StationEntity, StationColumn::CruiseId),
        foreign_key_index("idx_stations_block_id", StationEntity, StationColumn::BlockId),
        foreign_key_index("idx_samples_station_id", SampleEntity, SampleColumn::StationId),
        foreign_key_index("idx_ctd_data_station_id", CtdDataEntity, CtdDataColumn::StationId),
        foreign_key_index("idx_env_results_sample_id", EnvResultEntity, EnvResultColumn::SampleId),
        foreign_key_index("idx_geo_results_sample_id", GeoResultEntity, GeoResultColumn::SampleId),
        foreign_key_index("idx_photo_videos_sample_id", PhotoVideoEntity, PhotoVideoColumn::SampleId),
        foreign_key_index("idx_library_documents_contractor_id", LibraryDocumentEntity, LibraryDocumentColumn::ContractorId),
    ]
}

/// Create every table and foreign-key index that does not exist yet
pub async fn create_all<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let tables = tables(&schema);
    let table_count = tables.len();
    for stmt in tables {
        db.execute(backend.build(&stmt)).await?;
    }

    for stmt in indexes() {
        debug!(statement = %backend.build(&stmt).sql, "Creating index");
        db.execute(backend.build(&stmt)).await?;
    }

    info!(tables = table_count, "Database schema ready");
    Ok(())
}
