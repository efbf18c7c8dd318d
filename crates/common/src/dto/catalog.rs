//! Catalog records and the nested map-data document
//!
//! Flat `*Dto` types are returned by the list endpoints; `*Node` types wrap
//! them with their children for the map-data tree.

use crate::config::StorageConfig;
use crate::db::models::*;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parse a stored GeoJSON text column; malformed text is dropped
pub fn parse_boundary(raw: Option<&str>) -> Option<serde_json::Value> {
    raw.and_then(|text| serde_json::from_str(text).ok())
}

/// Id/name pair used by lookup endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupOption {
    pub id: i32,
    pub name: String,
}

impl From<&ContractType> for LookupOption {
    fn from(m: &ContractType) -> Self {
        Self { id: m.id, name: m.name.clone() }
    }
}

impl From<&ContractStatus> for LookupOption {
    fn from(m: &ContractStatus) -> Self {
        Self { id: m.id, name: m.name.clone() }
    }
}

impl From<&Contractor> for LookupOption {
    fn from(m: &Contractor) -> Self {
        Self { id: m.id, name: m.name.clone() }
    }
}

impl From<&Cruise> for LookupOption {
    fn from(m: &Cruise) -> Self {
        Self { id: m.id, name: m.name.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorDto {
    pub id: i32,
    pub name: String,
    pub contract_type_id: i32,
    pub contract_type: Option<String>,
    pub contract_status_id: i32,
    pub contract_status: Option<String>,
    pub sponsoring_state: String,
    pub contractual_year: i32,
    pub remarks: Option<String>,
}

impl ContractorDto {
    pub fn from_model(
        m: &Contractor,
        types: &HashMap<i32, String>,
        statuses: &HashMap<i32, String>,
    ) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
            contract_type_id: m.contract_type_id,
            contract_type: types.get(&m.contract_type_id).cloned(),
            contract_status_id: m.contract_status_id,
            contract_status: statuses.get(&m.contract_status_id).cloned(),
            sponsoring_state: m.sponsoring_state.clone(),
            contractual_year: m.contractual_year,
            remarks: m.remarks.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaDto {
    pub id: i32,
    pub contractor_id: i32,
    pub name: String,
    pub center_lat: f64,
    pub center_lon: f64,
    pub total_area_size_km2: f64,
    pub geojson_boundary: Option<serde_json::Value>,
    pub allocation_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
}

impl From<&ContractorArea> for AreaDto {
    fn from(m: &ContractorArea) -> Self {
        Self {
            id: m.id,
            contractor_id: m.contractor_id,
            name: m.name.clone(),
            center_lat: m.center_lat,
            center_lon: m.center_lon,
            total_area_size_km2: m.total_area_size_km2,
            geojson_boundary: parse_boundary(m.geojson_boundary.as_deref()),
            allocation_date: m.allocation_date,
            expiry_date: m.expiry_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDto {
    pub id: i32,
    pub area_id: i32,
    pub name: String,
    pub status: String,
    pub center_lat: f64,
    pub center_lon: f64,
    pub area_size_km2: f64,
    pub geojson_boundary: Option<serde_json::Value>,
}

impl From<&Block> for BlockDto {
    fn from(m: &Block) -> Self {
        Self {
            id: m.id,
            area_id: m.area_id,
            name: m.name.clone(),
            status: m.status.clone(),
            center_lat: m.center_lat,
            center_lon: m.center_lon,
            area_size_km2: m.area_size_km2,
            geojson_boundary: parse_boundary(m.geojson_boundary.as_deref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CruiseDto {
    pub id: i32,
    pub contractor_id: i32,
    pub name: String,
    pub research_vessel: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl From<&Cruise> for CruiseDto {
    fn from(m: &Cruise) -> Self {
        Self {
            id: m.id,
            contractor_id: m.contractor_id,
            name: m.name.clone(),
            research_vessel: m.research_vessel.clone(),
            start_date: m.start_date,
            end_date: m.end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationDto {
    pub id: i32,
    pub cruise_id: i32,
    pub block_id: Option<i32>,
    pub code: String,
    pub station_type: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Station> for StationDto {
    fn from(m: &Station) -> Self {
        Self {
            id: m.id,
            cruise_id: m.cruise_id,
            block_id: m.block_id,
            code: m.code.clone(),
            station_type: m.station_type.clone(),
            latitude: m.latitude,
            longitude: m.longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtdDto {
    pub id: i32,
    pub station_id: i32,
    pub depth_m: f64,
    pub temperature_c: Option<f64>,
    pub salinity_psu: Option<f64>,
    pub oxygen_umol_kg: Option<f64>,
    pub ph: Option<f64>,
    pub measured_at: Option<NaiveDateTime>,
}

impl From<&CtdData> for CtdDto {
    fn from(m: &CtdData) -> Self {
        Self {
            id: m.id,
            station_id: m.station_id,
            depth_m: m.depth_m,
            temperature_c: m.temperature_c,
            salinity_psu: m.salinity_psu,
            oxygen_umol_kg: m.oxygen_umol_kg,
            ph: m.ph,
            measured_at: m.measured_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDto {
    pub id: i32,
    pub station_id: i32,
    pub code: String,
    pub sample_type: String,
    pub matrix_type: Option<String>,
    pub habitat_type: Option<String>,
    pub sampling_device: Option<String>,
    pub depth_upper: f64,
    pub depth_lower: f64,
    pub analysis: Option<String>,
    pub result: Option<f64>,
    pub unit: Option<String>,
}

impl From<&Sample> for SampleDto {
    fn from(m: &Sample) -> Self {
        Self {
            id: m.id,
            station_id: m.station_id,
            code: m.code.clone(),
            sample_type: m.sample_type.clone(),
            matrix_type: m.matrix_type.clone(),
            habitat_type: m.habitat_type.clone(),
            sampling_device: m.sampling_device.clone(),
            depth_upper: m.depth_upper,
            depth_lower: m.depth_lower,
            analysis: m.analysis.clone(),
            result: m.result,
            unit: m.unit.clone(),
        }
    }
}

/// Environmental or geological result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultDto {
    pub id: i32,
    pub sample_id: i32,
    pub category: String,
    pub analysis: String,
    pub value: f64,
    pub unit: Option<String>,
    pub qualifier: Option<String>,
    pub remarks: Option<String>,
}

impl From<&EnvResult> for ResultDto {
    fn from(m: &EnvResult) -> Self {
        Self {
            id: m.id,
            sample_id: m.sample_id,
            category: m.category.clone(),
            analysis: m.analysis.clone(),
            value: m.value,
            unit: m.unit.clone(),
            qualifier: m.qualifier.clone(),
            remarks: m.remarks.clone(),
        }
    }
}

impl From<&GeoResult> for ResultDto {
    fn from(m: &GeoResult) -> Self {
        Self {
            id: m.id,
            sample_id: m.sample_id,
            category: m.category.clone(),
            analysis: m.analysis.clone(),
            value: m.value,
            unit: m.unit.clone(),
            qualifier: m.qualifier.clone(),
            remarks: m.remarks.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDto {
    pub id: i32,
    pub sample_id: i32,
    pub file_name: String,
    pub media_type: String,
    pub capture_date: Option<NaiveDate>,
    pub camera_specs: Option<String>,
    pub description: Option<String>,
    pub url: String,
}

impl MediaDto {
    pub fn from_model(m: &PhotoVideo, storage: &StorageConfig) -> Self {
        Self {
            id: m.id,
            sample_id: m.sample_id,
            file_name: m.file_name.clone(),
            media_type: m.media_type.clone(),
            capture_date: m.capture_date,
            camera_specs: m.camera_specs(),
            description: m.description.clone(),
            url: storage.media_url(&m.file_name),
        }
    }
}

// ============================================================================
// Map-data tree
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorNode {
    #[serde(flatten)]
    pub contractor: ContractorDto,
    #[serde(default)]
    pub areas: Vec<AreaNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaNode {
    #[serde(flatten)]
    pub area: AreaDto,
    #[serde(default)]
    pub blocks: Vec<BlockDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CruiseNode {
    #[serde(flatten)]
    pub cruise: CruiseDto,
    #[serde(default)]
    pub stations: Vec<StationNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationNode {
    #[serde(flatten)]
    pub station: StationDto,
    #[serde(default)]
    pub ctd_data: Vec<CtdDto>,
    #[serde(default)]
    pub samples: Vec<SampleNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleNode {
    #[serde(flatten)]
    pub sample: SampleDto,
    #[serde(default)]
    pub env_results: Vec<ResultDto>,
    #[serde(default)]
    pub geo_results: Vec<ResultDto>,
    #[serde(default)]
    pub media: Vec<MediaDto>,
}

/// Row counts per entity type in a map-data document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDataSummary {
    pub contractors: usize,
    pub areas: usize,
    pub blocks: usize,
    pub cruises: usize,
    pub stations: usize,
    pub ctd_readings: usize,
    pub samples: usize,
    pub env_results: usize,
    pub geo_results: usize,
    pub media: usize,
}

/// The nested document served by `GET /api/MapFilter/map-data`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapData {
    pub contractors: Vec<ContractorNode>,
    pub cruises: Vec<CruiseNode>,
    pub summary: MapDataSummary,
}

impl MapData {
    /// Recount every level of the tree
    pub fn count(&self) -> MapDataSummary {
        let areas = self.contractors.iter().flat_map(|c| &c.areas);
        let stations: Vec<&StationNode> = self.cruises.iter().flat_map(|c| &c.stations).collect();
        let samples: Vec<&SampleNode> = stations.iter().flat_map(|s| &s.samples).collect();

        MapDataSummary {
            contractors: self.contractors.len(),
            areas: self.contractors.iter().map(|c| c.areas.len()).sum(),
            blocks: areas.map(|a| a.blocks.len()).sum(),
            cruises: self.cruises.len(),
            stations: stations.len(),
            ctd_readings: stations.iter().map(|s| s.ctd_data.len()).sum(),
            samples: samples.len(),
            env_results: samples.iter().map(|s| s.env_results.len()).sum(),
            geo_results: samples.iter().map(|s| s.geo_results.len()).sum(),
            media: samples.iter().map(|s| s.media.len()).sum(),
        }
    }
}
