//! CTD (conductivity-temperature-depth) reading taken at a station

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Accepted measurement ranges, mirrored by CHECK constraints on the table
pub const TEMPERATURE_RANGE_C: (f64, f64) = (-2.5, 40.0);
pub const SALINITY_RANGE_PSU: (f64, f64) = (0.0, 42.0);
pub const OXYGEN_RANGE_UMOL_KG: (f64, f64) = (0.0, 500.0);
pub const PH_RANGE: (f64, f64) = (0.0, 14.0);

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ctd_data")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub station_id: i32,

    pub depth_m: f64,

    pub temperature_c: Option<f64>,

    pub salinity_psu: Option<f64>,

    pub oxygen_umol_kg: Option<f64>,

    pub ph: Option<f64>,

    pub measured_at: Option<DateTime>,
}

/// Check every present reading against its accepted range
pub fn validate_readings(
    temperature_c: Option<f64>,
    salinity_psu: Option<f64>,
    oxygen_umol_kg: Option<f64>,
    ph: Option<f64>,
) -> Result<(), DbErr> {
    let checks = [
        ("temperature_c", temperature_c, TEMPERATURE_RANGE_C),
        ("salinity_psu", salinity_psu, SALINITY_RANGE_PSU),
        ("oxygen_umol_kg", oxygen_umol_kg, OXYGEN_RANGE_UMOL_KG),
        ("ph", ph, PH_RANGE),
    ];

    for (field, value, (min, max)) in checks {
        if let Some(v) = value {
            if !(min..=max).contains(&v) {
                return Err(DbErr::Custom(format!(
                    "ctd_data.{} = {} is outside [{}, {}]",
                    field, v, min, max
                )));
            }
        }
    }

    Ok(())
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
        validate_readings(
            super::current(&self.temperature_c).flatten(),
            super::current(&self.salinity_psu).flatten(),
            super::current(&self.oxygen_umol_kg).flatten(),
            super::current(&self.ph).flatten(),
        )?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readings_inside_ranges_pass() {
        assert!(validate_readings(Some(2.1), Some(34.7), Some(180.0), Some(7.9)).is_ok());
        assert!(validate_readings(None, None, None, None).is_ok());
    }

    #[test]
    fn test_out_of_range_reading_is_rejected() {
        let err = validate_readings(Some(2.1), Some(34.7), Some(180.0), Some(15.2)).unwrap_err();
        assert!(err.to_string().contains("ph"));

        assert!(validate_readings(Some(-3.0), None, None, None).is_err());
    }
}
