//! Multi-section CSV rendering of a map-data document
//!
//! Layout: UTF-8 BOM, then one section per entity type. Each section is a
//! `# <Title>` line, a header row, one row per entity and a blank line.
//! Fields are `;`-separated and lines end with CRLF so the file opens
//! cleanly in spreadsheet software with a European list separator.

use crate::dto::*;
use regex_lite::Regex;
use std::fmt::Display;
use std::sync::OnceLock;

pub const BOM: char = '\u{feff}';
pub const DELIMITER: char = ';';
const CRLF: &str = "\r\n";

/// Values a spreadsheet would silently turn into a date (`15.8`, `3/4`, `1-12`)
const DATE_LIKE: &str = r"^\d{1,2}[-/.]\d{1,2}([-/.]\d{2,4})?$";

pub const SECTIONS: [&str; 10] = [
    "Contractors",
    "Areas",
    "Blocks",
    "Cruises",
    "Stations",
    "CTD Data",
    "Samples",
    "Environmental Results",
    "Geological Results",
    "Media",
];

const RESULT_HEADER: &[&str] = &["Id", "Sample Id", "Category", "Analysis", "Value", "Unit", "Qualifier", "Remarks"];

fn date_like(value: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(DATE_LIKE).ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

/// Escape one field: date guard first, then quoting
pub fn escape_field(value: &str) -> String {
    let guarded = if date_like(value) {
        format!("=\"{}\"", value)
    } else {
        value.to_string()
    };

    if guarded.contains([DELIMITER, '"', '\r', '\n']) {
        format!("\"{}\"", guarded.replace('"', "\"\""))
    } else {
        guarded
    }
}

fn opt<T: Display>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

struct SectionWriter {
    out: String,
}

impl SectionWriter {
    fn new() -> Self {
        let mut out = String::new();
        out.push(BOM);
        Self { out }
    }

    fn line<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let escaped: Vec<String> = fields.into_iter().map(|f| escape_field(f.as_ref())).collect();
        self.out.push_str(&escaped.join(&DELIMITER.to_string()));
        self.out.push_str(CRLF);
    }

    fn section<R>(&mut self, title: &str, header: &[&str], rows: R)
    where
        R: IntoIterator<Item = Vec<String>>,
    {
        self.out.push_str("# ");
        self.out.push_str(title);
        self.out.push_str(CRLF);
        self.line(header.iter());
        for row in rows {
            self.line(row);
        }
        self.out.push_str(CRLF);
    }
}

fn result_row(r: &ResultDto) -> Vec<String> {
    vec![
        r.id.to_string(),
        r.sample_id.to_string(),
        r.category.clone(),
        r.analysis.clone(),
        r.value.to_string(),
        opt(&r.unit),
        opt(&r.qualifier),
        opt(&r.remarks),
    ]
}

/// Flatten the map-data tree depth-first into the sectioned CSV blob
pub fn map_data_to_csv(data: &MapData) -> String {
    let areas: Vec<&AreaNode> = data.contractors.iter().flat_map(|c| &c.areas).collect();
    let blocks: Vec<&BlockDto> = areas.iter().flat_map(|a| &a.blocks).collect();
    let stations: Vec<&StationNode> = data.cruises.iter().flat_map(|c| &c.stations).collect();
    let ctd: Vec<&CtdDto> = stations.iter().flat_map(|s| &s.ctd_data).collect();
    let samples: Vec<&SampleNode> = stations.iter().flat_map(|s| &s.samples).collect();

    let mut w = SectionWriter::new();

    w.section(
        SECTIONS[0],
        &["Id", "Name", "Contract Type", "Contract Status", "Sponsoring State", "Contractual Year", "Remarks"],
        data.contractors.iter().map(|c| {
            let c = &c.contractor;
            vec![
                c.id.to_string(),
                c.name.clone(),
                opt(&c.contract_type),
                opt(&c.contract_status),
                c.sponsoring_state.clone(),
                c.contractual_year.to_string(),
                opt(&c.remarks),
            ]
        }),
    );

    w.section(
        SECTIONS[1],
        &["Id", "Contractor Id", "Name", "Center Lat", "Center Lon", "Total Area (km2)", "Allocation Date", "Expiry Date"],
        areas.iter().map(|a| {
            let a = &a.area;
            vec![
                a.id.to_string(),
                a.contractor_id.to_string(),
                a.name.clone(),
                a.center_lat.to_string(),
                a.center_lon.to_string(),
                a.total_area_size_km2.to_string(),
                opt(&a.allocation_date),
                opt(&a.expiry_date),
            ]
        }),
    );

    w.section(
        SECTIONS[2],
        &["Id", "Area Id", "Name", "Status", "Center Lat", "Center Lon", "Area Size (km2)"],
        blocks.iter().map(|b| {
            vec![
                b.id.to_string(),
                b.area_id.to_string(),
                b.name.clone(),
                b.status.clone(),
                b.center_lat.to_string(),
                b.center_lon.to_string(),
                b.area_size_km2.to_string(),
            ]
        }),
    );

    w.section(
        SECTIONS[3],
        &["Id", "Contractor Id", "Name", "Research Vessel", "Start Date", "End Date"],
        data.cruises.iter().map(|c| {
            let c = &c.cruise;
            vec![
                c.id.to_string(),
                c.contractor_id.to_string(),
                c.name.clone(),
                opt(&c.research_vessel),
                c.start_date.to_string(),
                opt(&c.end_date),
            ]
        }),
    );

    w.section(
        SECTIONS[4],
        &["Id", "Cruise Id", "Block Id", "Code", "Station Type", "Latitude", "Longitude"],
        stations.iter().map(|s| {
            let s = &s.station;
            vec![
                s.id.to_string(),
                s.cruise_id.to_string(),
                opt(&s.block_id),
                s.code.clone(),
                opt(&s.station_type),
                s.latitude.to_string(),
                s.longitude.to_string(),
            ]
        }),
    );

    w.section(
        SECTIONS[5],
        &["Id", "Station Id", "Depth (m)", "Temperature (C)", "Salinity (PSU)", "Oxygen (umol/kg)", "pH", "Measured At"],
        ctd.iter().map(|r| {
            vec![
                r.id.to_string(),
                r.station_id.to_string(),
                r.depth_m.to_string(),
                opt(&r.temperature_c),
                opt(&r.salinity_psu),
                opt(&r.oxygen_umol_kg),
                opt(&r.ph),
                opt(&r.measured_at),
            ]
        }),
    );

    w.section(
        SECTIONS[6],
        &[
            "Id", "Station Id", "Code", "Sample Type", "Matrix Type", "Habitat Type", "Sampling Device",
            "Depth Upper", "Depth Lower", "Analysis", "Result", "Unit",
        ],
        samples.iter().map(|s| {
            let s = &s.sample;
            vec![
                s.id.to_string(),
                s.station_id.to_string(),
                s.code.clone(),
                s.sample_type.clone(),
                opt(&s.matrix_type),
                opt(&s.habitat_type),
                opt(&s.sampling_device),
                s.depth_upper.to_string(),
                s.depth_lower.to_string(),
                opt(&s.analysis),
                opt(&s.result),
                opt(&s.unit),
            ]
        }),
    );

    w.section(
        SECTIONS[7],
        RESULT_HEADER,
        samples.iter().flat_map(|s| &s.env_results).map(result_row),
    );

    w.section(
        SECTIONS[8],
        RESULT_HEADER,
        samples.iter().flat_map(|s| &s.geo_results).map(result_row),
    );

    w.section(
        SECTIONS[9],
        &["Id", "Sample Id", "File Name", "Media Type", "Capture Date", "Camera", "Description", "URL"],
        samples.iter().flat_map(|s| &s.media).map(|m| {
            vec![
                m.id.to_string(),
                m.sample_id.to_string(),
                m.file_name.clone(),
                m.media_type.clone(),
                opt(&m.capture_date),
                opt(&m.camera_specs),
                opt(&m.description),
                m.url.clone(),
            ]
        }),
    );

    w.out
}

/// Split on CRLF outside quoted fields
fn records(blob: &str) -> Vec<&str> {
    let mut records = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    let bytes = blob.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'"' => in_quotes = !in_quotes,
            b'\r' if !in_quotes && bytes.get(i + 1) == Some(&b'\n') => {
                records.push(&blob[start..i]);
                i += 1;
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < blob.len() {
        records.push(&blob[start..]);
    }
    records
}

/// Recover `(section title, data row count)` pairs from a CSV blob
pub fn read_sections(blob: &str) -> Vec<(String, usize)> {
    let body = blob.strip_prefix(BOM).unwrap_or(blob);
    let mut sections: Vec<(String, usize)> = Vec::new();
    let mut header_pending = false;

    for record in records(body) {
        if let Some(title) = record.strip_prefix("# ") {
            sections.push((title.to_string(), 0));
            header_pending = true;
        } else if record.is_empty() {
            header_pending = false;
        } else if header_pending {
            header_pending = false;
        } else if let Some((_, rows)) = sections.last_mut() {
            *rows += 1;
        }
    }

    sections
}

/// Expected `(section title, row count)` pairs for a document summary
pub fn section_counts(summary: &MapDataSummary) -> Vec<(String, usize)> {
    let counts = [
        summary.contractors,
        summary.areas,
        summary.blocks,
        summary.cruises,
        summary.stations,
        summary.ctd_readings,
        summary.samples,
        summary.env_results,
        summary.geo_results,
        summary.media,
    ];
    SECTIONS
        .iter()
        .zip(counts)
        .map(|(title, count)| (title.to_string(), count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{assemble_map_data, CatalogRows};
    use crate::config::StorageConfig;
    use crate::db::seed::SeedCatalog;

    fn seeded_map_data() -> MapData {
        let seed = SeedCatalog::bundled().unwrap();
        let rows = CatalogRows {
            contract_types: seed.contract_types,
            contract_statuses: seed.contract_statuses,
            contractors: seed.contractors,
            areas: seed.areas,
            blocks: seed.blocks,
            cruises: seed.cruises,
            stations: seed.stations,
            ctd_data: seed.ctd_data,
            samples: seed.samples,
            env_results: seed.env_results,
            geo_results: seed.geo_results,
            media: seed.media,
        };
        assemble_map_data(&rows, &StorageConfig::default())
    }

    #[test]
    fn test_date_guard() {
        assert_eq!(escape_field("15.8"), "\"=\"\"15.8\"\"\"");
        assert_eq!(escape_field("3/4"), "\"=\"\"3/4\"\"\"");
        assert_eq!(escape_field("1-12-2020"), "\"=\"\"1-12-2020\"\"\"");
        assert_eq!(escape_field("2019-05-10"), "2019-05-10");
        assert_eq!(escape_field("3020.5"), "3020.5");
        assert_eq!(escape_field("Box core"), "Box core");
    }

    #[test]
    fn test_quoting() {
        assert_eq!(escape_field("a;b"), "\"a;b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\r\nlines"), "\"two\r\nlines\"");
    }

    #[test]
    fn test_layout() {
        let blob = map_data_to_csv(&seeded_map_data());
        assert!(blob.starts_with('\u{feff}'));
        assert!(blob[BOM.len_utf8()..].starts_with("# Contractors\r\nId;Name;"));
        assert!(!blob.replace("\r\n", "").contains('\n'));

        let titles: Vec<String> = read_sections(&blob).into_iter().map(|(t, _)| t).collect();
        assert_eq!(titles, SECTIONS.map(String::from).to_vec());
    }

    #[test]
    fn test_section_counts_survive_round_trip() {
        let data = seeded_map_data();
        let blob = map_data_to_csv(&data);
        assert_eq!(read_sections(&blob), section_counts(&data.count()));
    }

    #[test]
    fn test_multiline_field_is_one_row() {
        let mut data = seeded_map_data();
        data.contractors[0].contractor.remarks = Some("line one\r\nline two; with \"quotes\"".into());

        let blob = map_data_to_csv(&data);
        assert_eq!(read_sections(&blob), section_counts(&data.count()));
    }

    #[test]
    fn test_empty_document() {
        let blob = map_data_to_csv(&MapData::default());
        let sections = read_sections(&blob);
        assert_eq!(sections.len(), SECTIONS.len());
        assert!(sections.iter().all(|(_, rows)| *rows == 0));
    }
}
