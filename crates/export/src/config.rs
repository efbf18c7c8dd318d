//! Export client configuration
//!
//! Loaded from `config/export.*` and `EXPORT__`-prefixed environment variables,
//! e.g. `EXPORT__FORMAT=geojson`, `EXPORT__FILTERS__CONTRACTOR_ID=6`. The
//! `filters` section is the API's own `MapDataFilter`.

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use seabed_common::dto::MapDataFilter;
use seabed_common::export::ExportFormat;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    /// Base URL of the catalog API, without the `/api` suffix
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default)]
    pub format: ExportFormat,

    /// Output file; defaults to `seabed-map-data.<ext>`
    #[serde(default)]
    pub output: Option<PathBuf>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub json_logging: bool,

    #[serde(default)]
    pub filters: MapDataFilter,
}

fn default_api_base_url() -> String { "http://localhost:8080".to_string() }
fn default_timeout() -> u64 { 120 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            format: ExportFormat::default(),
            output: None,
            timeout_secs: default_timeout(),
            log_level: default_log_level(),
            json_logging: false,
            filters: MapDataFilter::default(),
        }
    }
}

impl ExportConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("config/export").required(false))
                .add_source(
                    Environment::with_prefix("EXPORT")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let ext = match self.format {
                ExportFormat::Csv => "csv",
                ExportFormat::GeoJson => "geojson",
            };
            PathBuf::from(format!("seabed-map-data.{}", ext))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.format, ExportFormat::Csv);
        assert_eq!(config.output_path(), PathBuf::from("seabed-map-data.csv"));
        assert!(config.filters.is_empty());
    }

    #[test]
    fn test_geojson_output_extension() {
        let config = ExportConfig { format: ExportFormat::GeoJson, ..Default::default() };
        assert_eq!(config.output_path(), PathBuf::from("seabed-map-data.geojson"));
    }

    #[test]
    fn test_filters_section_fills_map_data_filter() {
        let toml = r#"
            format = "geojson"

            [filters]
            contractor_id = 6
            sponsoring_state = "Germany"
        "#;
        let config = ExportConfig::from_builder(
            Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
        )
        .unwrap();

        assert_eq!(config.format, ExportFormat::GeoJson);
        assert_eq!(
            config.filters,
            MapDataFilter {
                contractor_id: Some(6),
                sponsoring_state: Some("Germany".into()),
                ..Default::default()
            }
        );
    }
}
