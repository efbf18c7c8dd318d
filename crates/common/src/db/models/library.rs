//! Library document submitted by a contractor

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "library_documents")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub contractor_id: i32,

    #[sea_orm(column_type = "Text")]
    pub theme: String,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub year: i32,

    #[sea_orm(column_type = "Text", nullable)]
    pub country: Option<String>,

    pub is_confidential: bool,

    /// Object name inside the library container
    #[sea_orm(column_type = "Text")]
    pub file_name: String,

    pub submitted_at: DateTimeUtc,
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
}

impl Related<super::contractor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contractor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
