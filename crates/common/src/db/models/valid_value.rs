//! Controlled vocabulary: allowed values per field

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "valid_values")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Field the value applies to, e.g. "sample_type"
    #[sea_orm(column_type = "Text")]
    pub field: String,

    #[sea_orm(column_type = "Text")]
    pub value: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
