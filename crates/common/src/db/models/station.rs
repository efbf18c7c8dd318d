//! Sampling / measurement station occupied during a cruise

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub cruise_id: i32,

    /// Block containing the station; filled by the association job
    pub block_id: Option<i32>,

    #[sea_orm(column_type = "Text")]
    pub code: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub station_type: Option<String>,

    pub latitude: f64,

    pub longitude: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cruise::Entity",
        from = "Column::CruiseId",
        to = "super::cruise::Column::Id",
        on_delete = "Cascade"
    )]
    Cruise,

    #[sea_orm(
        belongs_to = "super::contractor_area_block::Entity",
        from = "Column::BlockId",
        to = "super::contractor_area_block::Column::Id",
        on_delete = "SetNull"
    )]
    Block,

    #[sea_orm(has_many = "super::sample::Entity")]
    Samples,

    #[sea_orm(has_many = "super::ctd_data::Entity")]
    CtdData,
}

impl Related<super::cruise::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cruise.def()
    }
}

impl Related<super::contractor_area_block::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Block.def()
    }
}

impl Related<super::sample::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Samples.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
