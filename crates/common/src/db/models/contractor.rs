//! Contractor entity: holder of an exploration contract

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contractors")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    pub contract_type_id: i32,

    pub contract_status_id: i32,

    /// Sponsoring State(s), as a display string
    #[sea_orm(column_type = "Text")]
    pub sponsoring_state: String,

    /// Year the contract was signed
    pub contractual_year: i32,

    #[sea_orm(column_type = "Text", nullable)]
    pub remarks: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::contract_type::Entity",
        from = "Column::ContractTypeId",
        to = "super::contract_type::Column::Id"
    )]
    ContractType,

    #[sea_orm(
        belongs_to = "super::contract_status::Entity",
        from = "Column::ContractStatusId",
        to = "super::contract_status::Column::Id"
    )]
    ContractStatus,

    #[sea_orm(has_many = "super::contractor_area::Entity")]
    Areas,

    #[sea_orm(has_many = "super::cruise::Entity")]
    Cruises,

    #[sea_orm(has_many = "super::library::Entity")]
    Library,
}

impl Related<super::contract_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContractType.def()
    }
}

impl Related<super::contract_status::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ContractStatus.def()
    }
}

impl Related<super::contractor_area::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Areas.def()
    }
}

impl Related<super::cruise::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cruises.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
