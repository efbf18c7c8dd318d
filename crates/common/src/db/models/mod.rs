//! SeaORM entity models
//!
//! Database entities for the exploration catalog

pub mod contract_type;
pub mod contract_status;
pub mod contractor;
pub mod contractor_area;
pub mod contractor_area_block;
pub mod cruise;
pub mod station;
pub mod sample;
pub mod ctd_data;
pub mod env_result;
pub mod geo_result;
pub mod photo_video;
pub mod library;
pub mod qualifier;
pub mod valid_value;

pub use contract_type::{
    Entity as ContractTypeEntity,
    Model as ContractType,
    ActiveModel as ContractTypeActiveModel,
    Column as ContractTypeColumn,
};

pub use contract_status::{
    Entity as ContractStatusEntity,
    Model as ContractStatus,
    ActiveModel as ContractStatusActiveModel,
    Column as ContractStatusColumn,
};

pub use contractor::{
    Entity as ContractorEntity,
    Model as Contractor,
    ActiveModel as ContractorActiveModel,
    Column as ContractorColumn,
};

pub use contractor_area::{
    Entity as ContractorAreaEntity,
    Model as ContractorArea,
    ActiveModel as ContractorAreaActiveModel,
    Column as ContractorAreaColumn,
};

pub use contractor_area_block::{
    Entity as BlockEntity,
    Model as Block,
    ActiveModel as BlockActiveModel,
    Column as BlockColumn,
};

pub use cruise::{
    Entity as CruiseEntity,
    Model as Cruise,
    ActiveModel as CruiseActiveModel,
    Column as CruiseColumn,
};

pub use station::{
    Entity as StationEntity,
    Model as Station,
    ActiveModel as StationActiveModel,
    Column as StationColumn,
};

pub use sample::{
    Entity as SampleEntity,
    Model as Sample,
    ActiveModel as SampleActiveModel,
    Column as SampleColumn,
};

pub use ctd_data::{
    Entity as CtdDataEntity,
    Model as CtdData,
    ActiveModel as CtdDataActiveModel,
    Column as CtdDataColumn,
};

pub use env_result::{
    Entity as EnvResultEntity,
    Model as EnvResult,
    ActiveModel as EnvResultActiveModel,
    Column as EnvResultColumn,
};

pub use geo_result::{
    Entity as GeoResultEntity,
    Model as GeoResult,
    ActiveModel as GeoResultActiveModel,
    Column as GeoResultColumn,
};

pub use photo_video::{
    Entity as PhotoVideoEntity,
    Model as PhotoVideo,
    ActiveModel as PhotoVideoActiveModel,
    Column as PhotoVideoColumn,
};

pub use library::{
    Entity as LibraryDocumentEntity,
    Model as LibraryDocument,
    ActiveModel as LibraryDocumentActiveModel,
    Column as LibraryDocumentColumn,
};

pub use qualifier::{
    Entity as QualifierEntity,
    Model as Qualifier,
    ActiveModel as QualifierActiveModel,
    Column as QualifierColumn,
};

pub use valid_value::{
    Entity as ValidValueEntity,
    Model as ValidValue,
    ActiveModel as ValidValueActiveModel,
    Column as ValidValueColumn,
};

use sea_orm::{ActiveValue, Value};

/// Value currently held by an active model field, if any
pub(crate) fn current<V>(value: &ActiveValue<V>) -> Option<V>
where
    V: Into<Value> + Clone,
{
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v.clone()),
        ActiveValue::NotSet => None,
    }
}
