//! Exploration area allocated to a contractor

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contractor_areas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub contractor_id: i32,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    pub center_lat: f64,

    pub center_lon: f64,

    pub total_area_size_km2: f64,

    /// GeoJSON geometry (Polygon/MultiPolygon) or Feature, stored as text
    #[sea_orm(column_type = "Text", nullable)]
    pub geojson_boundary: Option<String>,

    pub allocation_date: Option<Date>,

    pub expiry_date: Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contractor::Entity",
        from = "Column::ContractorId",
        to = "super::contractor::Column::Id",
        on_delete = "Cascade"
    )]
    Contractor,

    #[sea_orm(has_many = "super::contractor_area_block::Entity")]
    Blocks,
}

impl Related<super::contractor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contractor.def()
    }
}

impl Related<super::contractor_area_block::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Blocks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
