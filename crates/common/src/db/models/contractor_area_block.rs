//! Block: the smallest spatial subdivision of an exploration area

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contractor_area_blocks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub area_id: i32,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    /// Allocation status, e.g. "Allocated", "Reserved", "Relinquished"
    #[sea_orm(column_type = "Text")]
    pub status: String,

    pub center_lat: f64,

    pub center_lon: f64,

    pub area_size_km2: f64,

    #[sea_orm(column_type = "Text", nullable)]
    pub geojson_boundary: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contractor_area::Entity",
        from = "Column::AreaId",
        to = "super::contractor_area::Column::Id",
        on_delete = "Cascade"
    )]
    Area,

    #[sea_orm(has_many = "super::station::Entity")]
    Stations,
}

impl Related<super::contractor_area::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Area.def()
    }
}

impl Related<super::station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
