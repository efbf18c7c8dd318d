//! GeoJSON rendering of areas, blocks and stations

use crate::dto::*;
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Reduce a stored boundary to a bare geometry object
fn geometry_of(boundary: &Value) -> Option<Value> {
    match boundary.get("type").and_then(Value::as_str)? {
        "Feature" => boundary.get("geometry").filter(|g| !g.is_null()).cloned(),
        "FeatureCollection" => {
            let geometries: Vec<Value> = boundary
                .get("features")?
                .as_array()?
                .iter()
                .filter_map(geometry_of)
                .collect();
            Some(json!({ "type": "GeometryCollection", "geometries": geometries }))
        }
        _ => Some(boundary.clone()),
    }
}

fn feature(geometry: Option<Value>, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": geometry.unwrap_or(Value::Null),
        "properties": properties,
    })
}

pub fn feature_collection(features: Vec<Value>) -> Value {
    json!({ "type": "FeatureCollection", "features": features })
}

pub fn area_feature(area: &AreaDto) -> Value {
    feature(
        area.geojson_boundary.as_ref().and_then(geometry_of),
        json!({
            "featureType": "area",
            "id": area.id,
            "contractorId": area.contractor_id,
            "name": area.name,
            "totalAreaSizeKm2": area.total_area_size_km2,
            "allocationDate": area.allocation_date,
            "expiryDate": area.expiry_date,
        }),
    )
}

pub fn block_feature(block: &BlockDto) -> Value {
    feature(
        block.geojson_boundary.as_ref().and_then(geometry_of),
        json!({
            "featureType": "block",
            "id": block.id,
            "areaId": block.area_id,
            "name": block.name,
            "status": block.status,
            "areaSizeKm2": block.area_size_km2,
        }),
    )
}

pub fn station_feature(station: &StationNode) -> Value {
    let s = &station.station;
    feature(
        Some(json!({ "type": "Point", "coordinates": [s.longitude, s.latitude] })),
        json!({
            "featureType": "station",
            "id": s.id,
            "cruiseId": s.cruise_id,
            "blockId": s.block_id,
            "code": s.code,
            "stationType": s.station_type,
            "sampleCount": station.samples.len(),
        }),
    )
}

/// Areas, then blocks, then stations
pub fn map_data_to_geojson(data: &MapData) -> Value {
    let areas: Vec<&AreaNode> = data.contractors.iter().flat_map(|c| &c.areas).collect();

    let mut features: Vec<Value> = areas.iter().map(|a| area_feature(&a.area)).collect();
    features.extend(areas.iter().flat_map(|a| &a.blocks).map(block_feature));
    features.extend(
        data.cruises
            .iter()
            .flat_map(|c| &c.stations)
            .map(station_feature),
    );

    feature_collection(features)
}

/// Count features per `featureType`
pub fn feature_counts(collection: &Value) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    let features = collection
        .get("features")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for f in features {
        let kind = f
            .pointer("/properties/featureType")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        *counts.entry(kind.to_string()).or_insert(0) += 1;
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area(boundary: Option<Value>) -> AreaDto {
        AreaDto {
            id: 6,
            contractor_id: 6,
            name: "Mid-Atlantic Ridge Sulphide Area".into(),
            center_lat: 19.5,
            center_lon: -45.0,
            total_area_size_km2: 10000.0,
            geojson_boundary: boundary,
            allocation_date: None,
            expiry_date: None,
        }
    }

    fn polygon() -> Value {
        json!({ "type": "Polygon", "coordinates": [[[-46.0, 12.0], [-44.0, 12.0], [-44.0, 27.0], [-46.0, 27.0], [-46.0, 12.0]]] })
    }

    #[test]
    fn test_feature_boundary_is_unwrapped() {
        let wrapped = json!({ "type": "Feature", "geometry": polygon(), "properties": {} });
        let f = area_feature(&area(Some(wrapped)));
        assert_eq!(f["geometry"], polygon());
        assert_eq!(f["properties"]["featureType"], "area");
        assert_eq!(f["properties"]["contractorId"], 6);
    }

    #[test]
    fn test_missing_boundary_has_null_geometry() {
        let f = area_feature(&area(None));
        assert!(f["geometry"].is_null());
    }

    #[test]
    fn test_feature_collection_boundary_becomes_geometry_collection() {
        let fc = json!({ "type": "FeatureCollection", "features": [
            { "type": "Feature", "geometry": polygon(), "properties": {} },
            { "type": "Feature", "geometry": null, "properties": {} }
        ]});
        let f = area_feature(&area(Some(fc)));
        assert_eq!(f["geometry"]["type"], "GeometryCollection");
        assert_eq!(f["geometry"]["geometries"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_station_point_is_lon_lat() {
        let node = StationNode {
            station: StationDto {
                id: 9,
                cruise_id: 7,
                block_id: Some(6),
                code: "TAG-ST01".into(),
                station_type: None,
                latitude: 26.137,
                longitude: -44.826,
            },
            ctd_data: vec![],
            samples: vec![],
        };
        let f = station_feature(&node);
        assert_eq!(f["geometry"]["coordinates"], json!([-44.826, 26.137]));
        assert_eq!(f["properties"]["blockId"], 6);
    }

    #[test]
    fn test_collection_counts_by_type() {
        let data = MapData {
            contractors: vec![],
            cruises: vec![],
            summary: MapDataSummary::default(),
        };
        let fc = map_data_to_geojson(&data);
        assert_eq!(fc["type"], "FeatureCollection");
        assert!(feature_counts(&fc).is_empty());

        let fc = feature_collection(vec![area_feature(&area(None)), area_feature(&area(None))]);
        assert_eq!(feature_counts(&fc)["area"], 2);

        let stray = json!({ "type": "FeatureCollection", "features": [{ "type": "Feature" }] });
        assert_eq!(
            feature_counts(&stray).into_iter().collect::<Vec<_>>(),
            vec![("unknown".to_string(), 1)]
        );
    }
}
