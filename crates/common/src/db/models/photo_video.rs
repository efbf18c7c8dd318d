//! Photo or video captured for a sample

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "photo_videos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub sample_id: i32,

    /// Object name inside the media container
    #[sea_orm(column_type = "Text")]
    pub file_name: String,

    /// "Photo" or "Video"
    #[sea_orm(column_type = "Text")]
    pub media_type: String,

    pub capture_date: Option<Date>,

    #[sea_orm(column_type = "Text", nullable)]
    pub camera_make: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub camera_model: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

impl Model {
    /// Camera make and model joined for display
    pub fn camera_specs(&self) -> Option<String> {
        match (self.camera_make.as_deref(), self.camera_model.as_deref()) {
            (Some(make), Some(model)) => Some(format!("{} {}", make, model)),
            (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
            (None, None) => None,
        }
    }
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
