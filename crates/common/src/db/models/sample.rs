//! Physical sample collected at a station

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "samples")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub station_id: i32,

    #[sea_orm(column_type = "Text")]
    pub code: String,

    #[sea_orm(column_type = "Text")]
    pub sample_type: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub matrix_type: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub habitat_type: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub sampling_device: Option<String>,

    /// Must be strictly greater than `depth_lower`
    pub depth_upper: f64,

    pub depth_lower: f64,

    #[sea_orm(column_type = "Text", nullable)]
    pub analysis: Option<String>,

    pub result: Option<f64>,

    #[sea_orm(column_type = "Text", nullable)]
    pub unit: Option<String>,
}

/// Reject depth intervals where the upper bound does not exceed the lower bound
pub fn validate_depth_range(depth_upper: f64, depth_lower: f64) -> Result<(), DbErr> {
    if depth_upper > depth_lower {
        Ok(())
    } else {
        Err(DbErr::Custom(format!(
            "samples.depth_upper ({}) must be greater than samples.depth_lower ({})",
            depth_upper, depth_lower
        )))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::station::Entity",
        from = "Column::StationId",
        to = "super::station::Column::Id",
        on_delete = "Cascade"
    )]
    Station,

    #[sea_orm(has_many = "super::env_result::Entity")]
    EnvResults,

    #[sea_orm(has_many = "super::geo_result::Entity")]
    GeoResults,

    #[sea_orm(has_many = "super::photo_video::Entity")]
    Media,
}

impl Related<super::station::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Station.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if let (Some(upper), Some(lower)) = (
            super::current(&self.depth_upper),
            super::current(&self.depth_lower),
        ) {
            validate_depth_range(upper, lower)?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_range_validation() {
        assert!(validate_depth_range(10.0, 0.0).is_ok());
        assert!(validate_depth_range(5.0, 5.0).is_err());
        assert!(validate_depth_range(0.0, 10.0).is_err());
    }
}
