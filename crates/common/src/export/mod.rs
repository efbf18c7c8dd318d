//! Export formats for the map-data document
//!
//! - `csv`: sectioned, spreadsheet-safe CSV
//! - `geojson`: FeatureCollection of areas, blocks and stations

pub mod csv;
pub mod geojson;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    GeoJson,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::GeoJson => "geojson",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names_match_config_values() {
        for format in [ExportFormat::Csv, ExportFormat::GeoJson] {
            let parsed: ExportFormat =
                serde_json::from_value(serde_json::json!(format.as_str())).unwrap();
            assert_eq!(parsed, format);
        }
        assert!(serde_json::from_str::<ExportFormat>("\"xlsx\"").is_err());
    }
}
