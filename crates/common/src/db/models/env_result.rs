//! Environmental measurement attached to a sample

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "env_results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub sample_id: i32,

    #[sea_orm(column_type = "Text")]
    pub category: String,

    /// Analysis / parameter name, e.g. "Copper"
    #[sea_orm(column_type = "Text")]
    pub analysis: String,

    pub value: f64,

    #[sea_orm(column_type = "Text", nullable)]
    pub unit: Option<String>,

    /// Code from the qualifiers table, e.g. "<" for below detection limit
    #[sea_orm(column_type = "Text", nullable)]
    pub qualifier: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub remarks: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sample::Entity",
        from = "Column::SampleId",
        to = "super::sample::Column::Id",
        on_delete = "Cascade"
    )]
    Sample,
}

impl Related<super::sample::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sample.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
