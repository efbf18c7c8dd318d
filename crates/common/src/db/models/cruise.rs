//! Research cruise

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cruises")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub contractor_id: i32,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub research_vessel: Option<String>,

    pub start_date: Date,

    pub end_date: Option<Date>,
}

impl Model {
    /// Inclusive length of the cruise in days; an open-ended cruise counts one day
    pub fn expedition_days(&self) -> i64 {
        match self.end_date {
            Some(end) if end >= self.start_date => (end - self.start_date).num_days() + 1,
            _ => 1,
        }
    }
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

    #[sea_orm(has_many = "super::station::Entity")]
    Stations,
}

impl Related<super::contractor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contractor.def()
    }
}

impl Related<super::station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
