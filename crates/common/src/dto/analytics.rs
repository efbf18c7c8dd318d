//! Analytics rollups and association job results

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCounts {
    pub areas: usize,
    pub blocks: usize,
    pub cruises: usize,
    pub stations: usize,
    pub samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaBreakdown {
    pub area_id: i32,
    pub area_name: String,
    pub block_count: usize,
    pub total_area_km2: f64,
}

/// `GET /api/Analytics/contractor/{id}/summary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractorSummary {
    pub contractor_id: i32,
    pub contractor_name: String,
    pub counts: SummaryCounts,
    /// Sum of child block sizes
    pub total_area_km2: f64,
    pub areas: Vec<AreaBreakdown>,
    pub earliest_cruise_date: Option<NaiveDate>,
    pub latest_cruise_date: Option<NaiveDate>,
    pub total_expedition_days: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockCounts {
    pub stations: usize,
    pub samples: usize,
    pub cruises: usize,
    pub env_results: usize,
    pub geo_results: usize,
    pub media: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleTypeCount {
    pub sample_type: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStation {
    pub station_id: i32,
    pub code: String,
    pub station_type: Option<String>,
    pub cruise_id: i32,
    pub latitude: f64,
    pub longitude: f64,
    pub sample_count: usize,
}

/// Numeric rollup of one analysis; `value` is the mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub name: String,
    pub category: String,
    pub unit: Option<String>,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

/// `GET /api/Analytics/block/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockAnalytics {
    pub block_id: i32,
    pub block_name: String,
    pub status: String,
    pub area_size_km2: f64,
    pub area_id: i32,
    pub area_name: Option<String>,
    pub contractor_id: Option<i32>,
    pub contractor_name: Option<String>,
    pub counts: BlockCounts,
    pub sample_types: Vec<SampleTypeCount>,
    pub stations: Vec<BlockStation>,
    pub environmental_metrics: Vec<MetricSummary>,
    pub resource_metrics: Vec<MetricSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationAssignment {
    pub station_id: i32,
    pub block_id: i32,
}

/// A station whose position falls inside more than one block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbiguousStation {
    pub station_id: i32,
    pub candidate_block_ids: Vec<i32>,
}

/// `POST /api/Analytics/associate-stations-blocks`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationReport {
    pub scanned: usize,
    pub assigned: usize,
    pub unmatched: usize,
    pub assignments: Vec<StationAssignment>,
    pub ambiguous: Vec<AmbiguousStation>,
}
