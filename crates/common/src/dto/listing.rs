//! Gallery, library, sample listing and facet payloads

use super::catalog::{LookupOption, MediaDto, SampleDto};
use crate::db::models::{Qualifier, ValidValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Media item enriched with its sample → station → cruise → contractor lineage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(flatten)]
    pub media: MediaDto,
    pub download_url: String,
    pub sample_code: Option<String>,
    pub station_id: Option<i32>,
    pub station_code: Option<String>,
    pub cruise_id: Option<i32>,
    pub cruise_name: Option<String>,
    pub contractor_id: Option<i32>,
    pub contractor_name: Option<String>,
}

/// Sample row with the names of its parents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleListItem {
    #[serde(flatten)]
    pub sample: SampleDto,
    pub station_code: Option<String>,
    pub cruise_id: Option<i32>,
    pub cruise_name: Option<String>,
    pub contractor_id: Option<i32>,
    pub contractor_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationOption {
    pub id: i32,
    pub code: String,
    pub cruise_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualifierDto {
    pub code: String,
    pub description: String,
}

impl From<Qualifier> for QualifierDto {
    fn from(m: Qualifier) -> Self {
        Self { code: m.code, description: m.description }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidValueDto {
    pub field: String,
    pub value: String,
    pub description: Option<String>,
}

impl From<ValidValue> for ValidValueDto {
    fn from(m: ValidValue) -> Self {
        Self { field: m.field, value: m.value, description: m.description }
    }
}

/// Library document; confidential documents carry no file URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryItem {
    pub id: i32,
    pub contractor_id: i32,
    pub contractor_name: Option<String>,
    pub theme: String,
    pub title: String,
    pub description: Option<String>,
    pub year: i32,
    pub country: Option<String>,
    pub is_confidential: bool,
    pub file_url: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Metadata for `POST /api/Library/upload`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LibraryUploadRequest {
    #[validate(range(min = 1))]
    pub contractor_id: i32,

    #[validate(length(min = 1, max = 100))]
    pub theme: String,

    #[validate(length(min = 1, max = 500))]
    pub title: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(range(min = 1950, max = 2100))]
    pub year: i32,

    #[validate(length(max = 100))]
    pub country: Option<String>,

    #[serde(default)]
    pub is_confidential: bool,

    #[validate(length(min = 1, max = 255), custom(function = "validate_file_name"))]
    pub file_name: String,
}

/// Object names are flat: no directory components
fn validate_file_name(name: &str) -> Result<(), ValidationError> {
    if name.contains('/') || name.contains('\\') || name.starts_with('.') {
        return Err(ValidationError::new("file_name_path"));
    }
    Ok(())
}

/// Available options per filter, as computed by the facet derivation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub contractors: Vec<LookupOption>,
    pub contract_types: Vec<LookupOption>,
    pub contract_statuses: Vec<LookupOption>,
    pub sponsoring_states: Vec<String>,
    pub contractual_years: Vec<i32>,
    pub cruises: Vec<LookupOption>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(file_name: &str) -> LibraryUploadRequest {
        LibraryUploadRequest {
            contractor_id: 2,
            theme: "Environmental Baseline".into(),
            title: "Annual report 2023".into(),
            description: None,
            year: 2023,
            country: Some("China".into()),
            is_confidential: false,
            file_name: file_name.into(),
        }
    }

    #[test]
    fn test_upload_validation_accepts_plain_file_names() {
        assert!(upload("comra_annual_2023.pdf").validate().is_ok());
    }

    #[test]
    fn test_upload_validation_rejects_paths_and_bad_years() {
        let err = upload("../secrets.pdf").validate().unwrap_err();
        assert!(err.field_errors().contains_key("file_name"));

        let mut request = upload("report.pdf");
        request.year = 1800;
        let err = request.validate().unwrap_err();
        assert!(err.field_errors().contains_key("year"));
    }
}
