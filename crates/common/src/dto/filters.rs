//! Query-string filters accepted by the list and aggregation endpoints

use serde::{Deserialize, Serialize};

/// Filters shared by `map-data`, `contractors` and `filter-options`
///
/// Snake-case aliases let config files and environment variables fill the same struct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDataFilter {
    #[serde(skip_serializing_if = "Option::is_none", alias = "contractor_id")]
    pub contractor_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "contract_type_id")]
    pub contract_type_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "contract_status_id")]
    pub contract_status_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "sponsoring_state")]
    pub sponsoring_state: Option<String>,
    /// Contractual year
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "cruise_id")]
    pub cruise_id: Option<i32>,
}

impl MapDataFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// The filter the user is currently changing; its options are left unrestricted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FacetKey {
    ContractorId,
    ContractTypeId,
    ContractStatusId,
    SponsoringState,
    Year,
    CruiseId,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFacetQuery {
    pub active_filter: Option<FacetKey>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaFilter {
    pub contractor_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockFilter {
    pub contractor_id: Option<i32>,
    pub area_id: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CruiseFilter {
    pub contractor_id: Option<i32>,
    pub cruise_id: Option<i32>,
}

/// Spatial / hierarchical scope used to narrow stations, samples and media
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationScope {
    pub contractor_id: Option<i32>,
    pub area_id: Option<i32>,
    pub block_id: Option<i32>,
    pub cruise_id: Option<i32>,
    pub station_id: Option<i32>,
}

impl StationScope {
    pub fn is_unrestricted(&self) -> bool {
        *self == Self::default()
    }
}

/// Filters for `Sample/list` and `MapFilter/samples`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleFilter {
    pub contractor_id: Option<i32>,
    pub cruise_id: Option<i32>,
    pub station_id: Option<i32>,
    pub sample_type: Option<String>,
    pub matrix_type: Option<String>,
    pub habitat_type: Option<String>,
    pub analysis: Option<String>,
}

impl SampleFilter {
    pub fn scope(&self) -> StationScope {
        StationScope {
            contractor_id: self.contractor_id,
            cruise_id: self.cruise_id,
            station_id: self.station_id,
            ..StationScope::default()
        }
    }
}

/// Filters for `Gallery/media` and `MapFilter/media`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaFilter {
    pub contractor_id: Option<i32>,
    pub area_id: Option<i32>,
    pub block_id: Option<i32>,
    pub cruise_id: Option<i32>,
    pub station_id: Option<i32>,
    pub sample_id: Option<i32>,
    pub media_type: Option<String>,
}

impl MediaFilter {
    pub fn scope(&self) -> StationScope {
        StationScope {
            contractor_id: self.contractor_id,
            area_id: self.area_id,
            block_id: self.block_id,
            cruise_id: self.cruise_id,
            station_id: self.station_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryFilter {
    pub contractor_id: Option<i32>,
    pub theme: Option<String>,
    pub year: Option<i32>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValidValueQuery {
    pub field: Option<String>,
}
