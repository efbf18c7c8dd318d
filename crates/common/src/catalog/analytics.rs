//! Contractor and block rollups, reduced in memory over loaded rows

use crate::db::models::*;
use crate::dto::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Rows beneath one contractor
#[derive(Debug, Clone)]
pub struct ContractorRows {
    pub contractor: Contractor,
    pub areas: Vec<ContractorArea>,
    pub blocks: Vec<Block>,
    pub cruises: Vec<Cruise>,
    pub stations: Vec<Station>,
    pub samples: Vec<Sample>,
}

pub fn contractor_summary(rows: &ContractorRows) -> ContractorSummary {
    let areas = rows
        .areas
        .iter()
        .map(|area| {
            let blocks: Vec<&Block> = rows.blocks.iter().filter(|b| b.area_id == area.id).collect();
            AreaBreakdown {
                area_id: area.id,
                area_name: area.name.clone(),
                block_count: blocks.len(),
                total_area_km2: blocks.iter().map(|b| b.area_size_km2).sum(),
            }
        })
        .collect();

    ContractorSummary {
        contractor_id: rows.contractor.id,
        contractor_name: rows.contractor.name.clone(),
        counts: SummaryCounts {
            areas: rows.areas.len(),
            blocks: rows.blocks.len(),
            cruises: rows.cruises.len(),
            stations: rows.stations.len(),
            samples: rows.samples.len(),
        },
        total_area_km2: rows.blocks.iter().map(|b| b.area_size_km2).sum(),
        areas,
        earliest_cruise_date: rows.cruises.iter().map(|c| c.start_date).min(),
        latest_cruise_date: rows
            .cruises
            .iter()
            .map(|c| c.end_date.unwrap_or(c.start_date))
            .max(),
        total_expedition_days: rows.cruises.iter().map(Cruise::expedition_days).sum(),
    }
}

/// Rows attached to one block through its stations
#[derive(Debug, Clone)]
pub struct BlockRows {
    pub block: Block,
    pub area: Option<ContractorArea>,
    pub contractor: Option<Contractor>,
    pub stations: Vec<Station>,
    pub samples: Vec<Sample>,
    pub env_results: Vec<EnvResult>,
    pub geo_results: Vec<GeoResult>,
    pub media: Vec<PhotoVideo>,
}

#[derive(Debug, Clone)]
struct MetricAccumulator {
    category: String,
    sum: f64,
    min: f64,
    max: f64,
    count: usize,
}

/// One measured value, borrowed from an env or geo result row
pub struct Measurement<'a> {
    pub category: &'a str,
    pub analysis: &'a str,
    pub unit: Option<&'a str>,
    pub value: f64,
}

impl<'a> From<&'a EnvResult> for Measurement<'a> {
    fn from(r: &'a EnvResult) -> Self {
        Self { category: &r.category, analysis: &r.analysis, unit: r.unit.as_deref(), value: r.value }
    }
}

impl<'a> From<&'a GeoResult> for Measurement<'a> {
    fn from(r: &'a GeoResult) -> Self {
        Self { category: &r.category, analysis: &r.analysis, unit: r.unit.as_deref(), value: r.value }
    }
}

/// Mean/min/max per (analysis, unit), ordered by analysis name.
/// Non-finite values are skipped.
pub fn group_metrics<'a, I>(measurements: I) -> Vec<MetricSummary>
where
    I: IntoIterator<Item = Measurement<'a>>,
{
    let mut groups: BTreeMap<(&str, Option<&str>), MetricAccumulator> = BTreeMap::new();

    for m in measurements.into_iter().filter(|m| m.value.is_finite()) {
        groups
            .entry((m.analysis, m.unit))
            .and_modify(|acc| {
                acc.sum += m.value;
                acc.min = acc.min.min(m.value);
                acc.max = acc.max.max(m.value);
                acc.count += 1;
            })
            .or_insert_with(|| MetricAccumulator {
                category: m.category.to_string(),
                sum: m.value,
                min: m.value,
                max: m.value,
                count: 1,
            });
    }

    groups
        .into_iter()
        .map(|((name, unit), acc)| MetricSummary {
            name: name.to_string(),
            category: acc.category,
            unit: unit.map(str::to_string),
            value: acc.sum / acc.count as f64,
            min: acc.min,
            max: acc.max,
            count: acc.count,
        })
        .collect()
}

pub fn block_analytics(rows: &BlockRows) -> BlockAnalytics {
    let station_ids: BTreeSet<i32> = rows.stations.iter().map(|s| s.id).collect();
    let samples: Vec<&Sample> = rows
        .samples
        .iter()
        .filter(|s| station_ids.contains(&s.station_id))
        .collect();
    let sample_ids: BTreeSet<i32> = samples.iter().map(|s| s.id).collect();

    let env: Vec<&EnvResult> = rows
        .env_results
        .iter()
        .filter(|r| sample_ids.contains(&r.sample_id))
        .collect();
    let geo: Vec<&GeoResult> = rows
        .geo_results
        .iter()
        .filter(|r| sample_ids.contains(&r.sample_id))
        .collect();
    let media = rows.media.iter().filter(|m| sample_ids.contains(&m.sample_id)).count();

    let mut samples_per_station: HashMap<i32, usize> = HashMap::new();
    let mut sample_types: BTreeMap<&str, usize> = BTreeMap::new();
    for sample in &samples {
        *samples_per_station.entry(sample.station_id).or_default() += 1;
        *sample_types.entry(sample.sample_type.as_str()).or_default() += 1;
    }

    let cruises: BTreeSet<i32> = rows.stations.iter().map(|s| s.cruise_id).collect();

    BlockAnalytics {
        block_id: rows.block.id,
        block_name: rows.block.name.clone(),
        status: rows.block.status.clone(),
        area_size_km2: rows.block.area_size_km2,
        area_id: rows.block.area_id,
        area_name: rows.area.as_ref().map(|a| a.name.clone()),
        contractor_id: rows.contractor.as_ref().map(|c| c.id),
        contractor_name: rows.contractor.as_ref().map(|c| c.name.clone()),
        counts: BlockCounts {
            stations: rows.stations.len(),
            samples: samples.len(),
            cruises: cruises.len(),
            env_results: env.len(),
            geo_results: geo.len(),
            media,
        },
        sample_types: sample_types
            .into_iter()
            .map(|(sample_type, count)| SampleTypeCount { sample_type: sample_type.to_string(), count })
            .collect(),
        stations: rows
            .stations
            .iter()
            .map(|s| BlockStation {
                station_id: s.id,
                code: s.code.clone(),
                station_type: s.station_type.clone(),
                cruise_id: s.cruise_id,
                latitude: s.latitude,
                longitude: s.longitude,
                sample_count: samples_per_station.get(&s.id).copied().unwrap_or(0),
            })
            .collect(),
        environmental_metrics: group_metrics(env.into_iter().map(Measurement::from)),
        resource_metrics: group_metrics(geo.into_iter().map(Measurement::from)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn block(id: i32, area_id: i32, size: f64) -> Block {
        Block {
            id,
            area_id,
            name: format!("Block {}", id),
            status: "Allocated".into(),
            center_lat: 0.0,
            center_lon: 0.0,
            area_size_km2: size,
            geojson_boundary: None,
        }
    }

    fn cruise(id: i32, start: NaiveDate, end: Option<NaiveDate>) -> Cruise {
        Cruise {
            id,
            contractor_id: 6,
            name: format!("Cruise {}", id),
            research_vessel: None,
            start_date: start,
            end_date: end,
        }
    }

    fn geo(id: i32, sample_id: i32, analysis: &str, value: f64) -> GeoResult {
        GeoResult {
            id,
            sample_id,
            category: "Metal content".into(),
            analysis: analysis.into(),
            value,
            unit: Some("wt%".into()),
            qualifier: None,
            remarks: None,
        }
    }

    fn sample(id: i32, station_id: i32, sample_type: &str) -> Sample {
        Sample {
            id,
            station_id,
            code: format!("S-{}", id),
            sample_type: sample_type.into(),
            matrix_type: None,
            habitat_type: None,
            sampling_device: None,
            depth_upper: 1.0,
            depth_lower: 0.0,
            analysis: None,
            result: None,
            unit: None,
        }
    }

    fn station(id: i32, cruise_id: i32) -> Station {
        Station {
            id,
            cruise_id,
            block_id: Some(6),
            code: format!("ST-{}", id),
            station_type: None,
            latitude: 26.1,
            longitude: -44.8,
        }
    }

    fn contractor() -> Contractor {
        Contractor {
            id: 6,
            name: "Government of the Russian Federation".into(),
            contract_type_id: 2,
            contract_status_id: 1,
            sponsoring_state: "Russian Federation".into(),
            contractual_year: 2012,
            remarks: None,
        }
    }

    #[test]
    fn test_contractor_summary_totals() {
        let rows = ContractorRows {
            contractor: contractor(),
            areas: vec![ContractorArea {
                id: 6,
                contractor_id: 6,
                name: "MAR".into(),
                center_lat: 0.0,
                center_lon: 0.0,
                total_area_size_km2: 10000.0,
                geojson_boundary: None,
                allocation_date: None,
                expiry_date: None,
            }],
            blocks: vec![block(6, 6, 1000.0), block(7, 6, 400.0)],
            cruises: vec![
                cruise(7, date(2016, 2, 10), Some(date(2016, 2, 12))),
                cruise(8, date(2022, 6, 1), None),
            ],
            stations: vec![station(9, 7)],
            samples: vec![sample(10, 9, "Sulphide")],
        };

        let summary = contractor_summary(&rows);
        assert_eq!(summary.counts.blocks, 2);
        assert_eq!(summary.total_area_km2, 1400.0);
        assert_eq!(summary.areas[0].total_area_km2, summary.total_area_km2);
        assert_eq!(summary.earliest_cruise_date, Some(date(2016, 2, 10)));
        // Open-ended cruise falls back to its start date
        assert_eq!(summary.latest_cruise_date, Some(date(2022, 6, 1)));
        assert_eq!(summary.total_expedition_days, 3 + 1);
    }

    #[test]
    fn test_contractor_without_cruises_has_no_dates() {
        let rows = ContractorRows {
            contractor: contractor(),
            areas: vec![],
            blocks: vec![],
            cruises: vec![],
            stations: vec![],
            samples: vec![],
        };
        let summary = contractor_summary(&rows);
        assert_eq!(summary.total_area_km2, 0.0);
        assert!(summary.earliest_cruise_date.is_none());
        assert_eq!(summary.total_expedition_days, 0);
    }

    #[test]
    fn test_group_metrics_mean_min_max() {
        let rows = vec![geo(1, 1, "Copper", 10.0), geo(2, 2, "Copper", 20.0), geo(3, 1, "Zinc", 4.2)];
        let metrics = group_metrics(rows.iter().map(Measurement::from));

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].name, "Copper");
        assert_eq!(metrics[0].value, 15.0);
        assert_eq!(metrics[0].min, 10.0);
        assert_eq!(metrics[0].max, 20.0);
        assert_eq!(metrics[0].count, 2);
        assert_eq!(metrics[1].name, "Zinc");
    }

    #[test]
    fn test_group_metrics_separates_units() {
        let mut ppm = geo(2, 1, "Copper", 1500.0);
        ppm.unit = Some("ppm".into());
        let rows = vec![geo(1, 1, "Copper", 1.5), ppm];

        let metrics = group_metrics(rows.iter().map(Measurement::from));
        assert_eq!(metrics.len(), 2);
        assert!(metrics.iter().all(|m| m.count == 1));
    }

    #[test]
    fn test_block_analytics_counts_and_histogram() {
        let rows = BlockRows {
            block: block(6, 6, 1000.0),
            area: None,
            contractor: Some(contractor()),
            stations: vec![station(9, 7), station(10, 7)],
            samples: vec![sample(10, 9, "Sulphide"), sample(11, 9, "Water"), sample(12, 10, "Sulphide")],
            env_results: vec![],
            geo_results: vec![geo(8, 10, "Copper", 15.8), geo(9, 12, "Zinc", 4.2)],
            media: vec![],
        };

        let analytics = block_analytics(&rows);
        assert_eq!(analytics.counts.stations, 2);
        assert_eq!(analytics.counts.samples, 3);
        assert_eq!(analytics.counts.cruises, 1);
        assert_eq!(analytics.counts.geo_results, 2);
        assert_eq!(analytics.contractor_name.as_deref(), Some("Government of the Russian Federation"));
        assert_eq!(
            analytics.sample_types,
            vec![
                SampleTypeCount { sample_type: "Sulphide".into(), count: 2 },
                SampleTypeCount { sample_type: "Water".into(), count: 1 },
            ]
        );
        assert_eq!(analytics.stations[0].sample_count, 2);

        let copper = analytics.resource_metrics.iter().find(|m| m.name == "Copper").unwrap();
        assert_eq!(copper.value, 15.8);
    }
}
