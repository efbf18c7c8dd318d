//! Map-data assembly: flat rows into the nested document

use crate::config::StorageConfig;
use crate::db::models::*;
use crate::dto::*;
use std::collections::HashMap;

/// Every row reachable from a map-data filter, each list ordered by id
#[derive(Debug, Clone, Default)]
pub struct CatalogRows {
    pub contract_types: Vec<ContractType>,
    pub contract_statuses: Vec<ContractStatus>,
    pub contractors: Vec<Contractor>,
    pub areas: Vec<ContractorArea>,
    pub blocks: Vec<Block>,
    pub cruises: Vec<Cruise>,
    pub stations: Vec<Station>,
    pub ctd_data: Vec<CtdData>,
    pub samples: Vec<Sample>,
    pub env_results: Vec<EnvResult>,
    pub geo_results: Vec<GeoResult>,
    pub media: Vec<PhotoVideo>,
}

/// Group children under their parent id, keeping input order
fn group_by<T, F>(rows: &[T], parent: F) -> HashMap<i32, Vec<&T>>
where
    F: Fn(&T) -> i32,
{
    let mut grouped: HashMap<i32, Vec<&T>> = HashMap::new();
    for row in rows {
        grouped.entry(parent(row)).or_default().push(row);
    }
    grouped
}

fn take<'a, T>(grouped: &mut HashMap<i32, Vec<&'a T>>, id: i32) -> Vec<&'a T> {
    grouped.remove(&id).unwrap_or_default()
}

fn lookup_names<'a, I>(rows: I) -> HashMap<i32, String>
where
    I: IntoIterator<Item = (i32, &'a str)>,
{
    rows.into_iter().map(|(id, name)| (id, name.to_string())).collect()
}

/// Contractors with their areas and blocks nested
pub fn contractor_nodes(
    contractors: &[Contractor],
    areas: &[ContractorArea],
    blocks: &[Block],
    contract_types: &[ContractType],
    contract_statuses: &[ContractStatus],
) -> Vec<ContractorNode> {
    let types = lookup_names(contract_types.iter().map(|t| (t.id, t.name.as_str())));
    let statuses = lookup_names(contract_statuses.iter().map(|s| (s.id, s.name.as_str())));

    let mut areas_by_contractor = group_by(areas, |a| a.contractor_id);
    let mut blocks_by_area = group_by(blocks, |b| b.area_id);

    contractors
        .iter()
        .map(|contractor| ContractorNode {
            contractor: ContractorDto::from_model(contractor, &types, &statuses),
            areas: take(&mut areas_by_contractor, contractor.id)
                .into_iter()
                .map(|area| AreaNode {
                    area: AreaDto::from(area),
                    blocks: take(&mut blocks_by_area, area.id)
                        .into_iter()
                        .map(BlockDto::from)
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

/// Build the map-data document.
///
/// Rows whose parent is not in `rows` are dropped, so the tree only holds
/// what the staged queries reached.
pub fn assemble_map_data(rows: &CatalogRows, storage: &StorageConfig) -> MapData {
    let contractors = contractor_nodes(
        &rows.contractors,
        &rows.areas,
        &rows.blocks,
        &rows.contract_types,
        &rows.contract_statuses,
    );

    let mut stations_by_cruise = group_by(&rows.stations, |s| s.cruise_id);
    let mut ctd_by_station = group_by(&rows.ctd_data, |c| c.station_id);
    let mut samples_by_station = group_by(&rows.samples, |s| s.station_id);
    let mut env_by_sample = group_by(&rows.env_results, |r| r.sample_id);
    let mut geo_by_sample = group_by(&rows.geo_results, |r| r.sample_id);
    let mut media_by_sample = group_by(&rows.media, |m| m.sample_id);

    let cruises = rows
        .cruises
        .iter()
        .map(|cruise| CruiseNode {
            cruise: CruiseDto::from(cruise),
            stations: take(&mut stations_by_cruise, cruise.id)
                .into_iter()
                .map(|station| StationNode {
                    station: StationDto::from(station),
                    ctd_data: take(&mut ctd_by_station, station.id)
                        .into_iter()
                        .map(CtdDto::from)
                        .collect(),
                    samples: take(&mut samples_by_station, station.id)
                        .into_iter()
                        .map(|sample| SampleNode {
                            sample: SampleDto::from(sample),
                            env_results: take(&mut env_by_sample, sample.id)
                                .into_iter()
                                .map(ResultDto::from)
                                .collect(),
                            geo_results: take(&mut geo_by_sample, sample.id)
                                .into_iter()
                                .map(ResultDto::from)
                                .collect(),
                            media: take(&mut media_by_sample, sample.id)
                                .into_iter()
                                .map(|m| MediaDto::from_model(m, storage))
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect();

    let mut document = MapData { contractors, cruises, summary: MapDataSummary::default() };
    document.summary = document.count();
    document
}
