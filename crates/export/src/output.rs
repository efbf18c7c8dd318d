//! Rendering the map-data document into an export file

use seabed_common::dto::MapData;
use seabed_common::export::{csv, geojson, ExportFormat};

pub struct Rendered {
    pub body: String,
    /// `(section or feature type, row count)` as read back from `body`
    pub counts: Vec<(String, usize)>,
}

pub fn render(data: &MapData, format: ExportFormat) -> serde_json::Result<Rendered> {
    match format {
        ExportFormat::Csv => {
            let body = csv::map_data_to_csv(data);
            let counts = csv::read_sections(&body);
            Ok(Rendered { body, counts })
        }
        ExportFormat::GeoJson => {
            let collection = geojson::map_data_to_geojson(data);
            let counts = geojson::feature_counts(&collection).into_iter().collect();
            Ok(Rendered { body: serde_json::to_string_pretty(&collection)?, counts })
        }
    }
}
