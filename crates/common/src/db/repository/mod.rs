//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations. Query methods
//! are grouped by API area:
//! - `map`: map filter lookups and the staged map-data load
//! - `analytics`: contractor/block rollup inputs and station association
//! - `gallery`: media with lineage
//! - `library`: document listing and upload
//! - `samples`: sample listing and vocabulary lookups

mod analytics;
mod gallery;
mod library;
mod map;
mod samples;

use crate::db::models::*;
use crate::db::DbPool;
use crate::dto::StationScope;
use crate::errors::Result;
use sea_orm::sea_query::SelectStatement;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait,
    Select,
};

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Shared query helpers
    // ========================================================================

    /// Rows whose `column` is one of `ids`, ordered by `order`
    async fn rows_in<E>(&self, column: E::Column, ids: &[i32], order: E::Column) -> Result<Vec<E::Model>>
    where
        E: EntityTrait,
    {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        E::find()
            .filter(column.is_in(ids.iter().copied()))
            .order_by_asc(order)
            .all(self.read_conn())
            .await
            .map_err(Into::into)
    }
}

/// Stations reachable from a hierarchical scope
fn scoped_stations(scope: &StationScope) -> Select<StationEntity> {
    let mut query = StationEntity::find();

    if let Some(id) = scope.station_id {
        query = query.filter(StationColumn::Id.eq(id));
    }
    if let Some(id) = scope.cruise_id {
        query = query.filter(StationColumn::CruiseId.eq(id));
    }
    if let Some(id) = scope.block_id {
        query = query.filter(StationColumn::BlockId.eq(id));
    }
    if let Some(id) = scope.area_id {
        query = query.filter(
            StationColumn::BlockId.in_subquery(
                BlockEntity::find()
                    .select_only()
                    .column(BlockColumn::Id)
                    .filter(BlockColumn::AreaId.eq(id))
                    .into_query(),
            ),
        );
    }
    if let Some(id) = scope.contractor_id {
        query = query.filter(
            StationColumn::CruiseId.in_subquery(
                CruiseEntity::find()
                    .select_only()
                    .column(CruiseColumn::Id)
                    .filter(CruiseColumn::ContractorId.eq(id))
                    .into_query(),
            ),
        );
    }

    query
}

/// `SELECT id FROM stations WHERE <scope>`
fn scoped_station_ids(scope: &StationScope) -> SelectStatement {
    scoped_stations(scope)
        .select_only()
        .column(StationColumn::Id)
        .into_query()
}

/// `SELECT id FROM samples WHERE station_id IN (<scope>)`
fn scoped_sample_ids(scope: &StationScope) -> SelectStatement {
    let mut query = SampleEntity::find().select_only().column(SampleColumn::Id);
    if !scope.is_unrestricted() {
        query = query.filter(SampleColumn::StationId.in_subquery(scoped_station_ids(scope)));
    }
    query.into_query()
}
