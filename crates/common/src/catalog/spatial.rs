//! Point-in-block containment for the station/block association job
//!
//! Block boundaries are stored as GeoJSON text (Polygon, MultiPolygon, Feature
//! or FeatureCollection). Coordinates are `[lon, lat]`. Blocks without a usable
//! boundary fall back to a square derived from their center and size.

use crate::db::models::{Block, Station};
use crate::dto::{AmbiguousStation, AssociationReport, StationAssignment};
use serde_json::Value;

/// Kilometres per degree of latitude
const KM_PER_DEGREE: f64 = 111.32;

/// A closed ring of `(lon, lat)` vertices
type Ring = Vec<(f64, f64)>;

#[derive(Debug, Clone, PartialEq)]
struct Polygon {
    exterior: Ring,
    holes: Vec<Ring>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BoundingBox {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
}

impl BoundingBox {
    fn of(ring: &[(f64, f64)]) -> Option<Self> {
        let (first, rest) = ring.split_first()?;
        let mut bbox = BoundingBox {
            min_lon: first.0,
            min_lat: first.1,
            max_lon: first.0,
            max_lat: first.1,
        };
        for &(lon, lat) in rest {
            bbox.min_lon = bbox.min_lon.min(lon);
            bbox.min_lat = bbox.min_lat.min(lat);
            bbox.max_lon = bbox.max_lon.max(lon);
            bbox.max_lat = bbox.max_lat.max(lat);
        }
        Some(bbox)
    }

    fn union(self, other: Self) -> Self {
        BoundingBox {
            min_lon: self.min_lon.min(other.min_lon),
            min_lat: self.min_lat.min(other.min_lat),
            max_lon: self.max_lon.max(other.max_lon),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    fn contains(&self, lon: f64, lat: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// Parsed block outline
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    polygons: Vec<Polygon>,
    bbox: BoundingBox,
}

impl Boundary {
    /// Parse GeoJSON text; `None` when it holds no polygonal geometry
    pub fn parse(text: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(text).ok()?;
        Self::from_geojson(&value)
    }

    pub fn from_geojson(value: &Value) -> Option<Self> {
        let mut polygons = Vec::new();
        collect_polygons(value, &mut polygons);
        Self::from_polygons(polygons)
    }

    /// Square of `area_km2` centred on the given point
    pub fn square(center_lon: f64, center_lat: f64, area_km2: f64) -> Option<Self> {
        if !(area_km2 > 0.0) {
            return None;
        }
        let half_side_km = area_km2.sqrt() / 2.0;
        let half_lat = half_side_km / KM_PER_DEGREE;
        let cos_lat = center_lat.to_radians().cos().abs().max(1e-6);
        let half_lon = half_lat / cos_lat;

        let ring = vec![
            (center_lon - half_lon, center_lat - half_lat),
            (center_lon + half_lon, center_lat - half_lat),
            (center_lon + half_lon, center_lat + half_lat),
            (center_lon - half_lon, center_lat + half_lat),
            (center_lon - half_lon, center_lat - half_lat),
        ];
        Self::from_polygons(vec![Polygon { exterior: ring, holes: Vec::new() }])
    }

    /// Outline of a block: its GeoJSON boundary, else the center/size square
    pub fn of_block(block: &Block) -> Option<Self> {
        block
            .geojson_boundary
            .as_deref()
            .and_then(Self::parse)
            .or_else(|| Self::square(block.center_lon, block.center_lat, block.area_size_km2))
    }

    fn from_polygons(polygons: Vec<Polygon>) -> Option<Self> {
        let bbox = polygons
            .iter()
            .filter_map(|p| BoundingBox::of(&p.exterior))
            .reduce(BoundingBox::union)?;
        Some(Self { polygons, bbox })
    }

    /// Containment test; points on an edge count as inside
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        if !self.bbox.contains(lon, lat) {
            return false;
        }
        self.polygons.iter().any(|polygon| {
            ring_contains(&polygon.exterior, lon, lat)
                && !polygon
                    .holes
                    .iter()
                    .any(|hole| ring_contains(hole, lon, lat) && !on_ring_edge(hole, lon, lat))
        })
    }
}

fn collect_polygons(value: &Value, out: &mut Vec<Polygon>) {
    match value.get("type").and_then(Value::as_str) {
        Some("Polygon") => {
            if let Some(polygon) = value.get("coordinates").and_then(parse_polygon) {
                out.push(polygon);
            }
        }
        Some("MultiPolygon") => {
            if let Some(parts) = value.get("coordinates").and_then(Value::as_array) {
                out.extend(parts.iter().filter_map(parse_polygon));
            }
        }
        Some("Feature") => {
            if let Some(geometry) = value.get("geometry") {
                collect_polygons(geometry, out);
            }
        }
        Some("FeatureCollection") => {
            if let Some(features) = value.get("features").and_then(Value::as_array) {
                for feature in features {
                    collect_polygons(feature, out);
                }
            }
        }
        Some("GeometryCollection") => {
            if let Some(geometries) = value.get("geometries").and_then(Value::as_array) {
                for geometry in geometries {
                    collect_polygons(geometry, out);
                }
            }
        }
        _ => {}
    }
}

fn parse_polygon(coordinates: &Value) -> Option<Polygon> {
    let mut rings = coordinates.as_array()?.iter().filter_map(parse_ring);
    let exterior = rings.next()?;
    Some(Polygon { exterior, holes: rings.collect() })
}

fn parse_ring(value: &Value) -> Option<Ring> {
    let ring: Ring = value
        .as_array()?
        .iter()
        .filter_map(|position| {
            let position = position.as_array()?;
            Some((position.first()?.as_f64()?, position.get(1)?.as_f64()?))
        })
        .collect();
    (ring.len() >= 3).then_some(ring)
}

/// Even-odd ray casting, with edge points treated as inside
fn ring_contains(ring: &[(f64, f64)], lon: f64, lat: f64) -> bool {
    if on_ring_edge(ring, lon, lat) {
        return true;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];
        if (yi > lat) != (yj > lat) {
            let x_cross = xi + (lat - yi) * (xj - xi) / (yj - yi);
            if lon < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn on_ring_edge(ring: &[(f64, f64)], lon: f64, lat: f64) -> bool {
    const EPS: f64 = 1e-9;
    ring.windows(2).any(|edge| {
        let ((x1, y1), (x2, y2)) = (edge[0], edge[1]);
        let cross = (x2 - x1) * (lat - y1) - (y2 - y1) * (lon - x1);
        cross.abs() <= EPS
            && lon >= x1.min(x2) - EPS
            && lon <= x1.max(x2) + EPS
            && lat >= y1.min(y2) - EPS
            && lat <= y1.max(y2) + EPS
    })
}

/// Decide block assignments for every unassigned station.
///
/// Blocks are tried in ascending id order and the first containing block
/// wins. Stations that already have a block are skipped.
pub fn plan_associations(stations: &[Station], blocks: &[Block]) -> AssociationReport {
    let mut ordered: Vec<&Block> = blocks.iter().collect();
    ordered.sort_by_key(|b| b.id);

    let outlines: Vec<(i32, Boundary)> = ordered
        .into_iter()
        .filter_map(|block| Boundary::of_block(block).map(|outline| (block.id, outline)))
        .collect();

    let mut report = AssociationReport::default();

    for station in stations.iter().filter(|s| s.block_id.is_none()) {
        report.scanned += 1;

        let candidates: Vec<i32> = outlines
            .iter()
            .filter(|(_, outline)| outline.contains(station.longitude, station.latitude))
            .map(|(id, _)| *id)
            .collect();

        match candidates.first() {
            Some(&block_id) => {
                report.assigned += 1;
                report.assignments.push(StationAssignment { station_id: station.id, block_id });
                if candidates.len() > 1 {
                    report.ambiguous.push(AmbiguousStation {
                        station_id: station.id,
                        candidate_block_ids: candidates,
                    });
                }
            }
            None => report.unmatched += 1,
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"{"type":"Polygon","coordinates":[[[-45.0,26.0],[-44.7,26.0],[-44.7,26.3],[-45.0,26.3],[-45.0,26.0]]]}"#;

    fn block(id: i32, boundary: Option<&str>) -> Block {
        Block {
            id,
            area_id: 1,
            name: format!("Block {}", id),
            status: "Allocated".into(),
            center_lat: 26.15,
            center_lon: -44.85,
            area_size_km2: 1000.0,
            geojson_boundary: boundary.map(str::to_string),
        }
    }

    fn station(id: i32, lon: f64, lat: f64, block_id: Option<i32>) -> Station {
        Station {
            id,
            cruise_id: 1,
            block_id,
            code: format!("ST-{}", id),
            station_type: None,
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn test_polygon_containment() {
        let outline = Boundary::parse(SQUARE).unwrap();
        assert!(outline.contains(-44.826, 26.137));
        assert!(!outline.contains(-44.5, 26.137));
        assert!(!outline.contains(-44.826, 27.0));
        // Edge points are inside
        assert!(outline.contains(-45.0, 26.1));
    }

    #[test]
    fn test_polygon_hole_excludes_interior() {
        let text = r#"{"type":"Polygon","coordinates":[
            [[0,0],[10,0],[10,10],[0,10],[0,0]],
            [[4,4],[6,4],[6,6],[4,6],[4,4]]
        ]}"#;
        let outline = Boundary::parse(text).unwrap();
        assert!(outline.contains(2.0, 2.0));
        assert!(!outline.contains(5.0, 5.0));
    }

    #[test]
    fn test_feature_and_multipolygon_wrappers() {
        let feature = format!(r#"{{"type":"Feature","properties":{{}},"geometry":{}}}"#, SQUARE);
        assert!(Boundary::parse(&feature).unwrap().contains(-44.9, 26.2));

        let multi = r#"{"type":"MultiPolygon","coordinates":[
            [[[0,0],[1,0],[1,1],[0,1],[0,0]]],
            [[[5,5],[6,5],[6,6],[5,6],[5,5]]]
        ]}"#;
        let outline = Boundary::parse(multi).unwrap();
        assert!(outline.contains(5.5, 5.5));
        assert!(!outline.contains(3.0, 3.0));
    }

    #[test]
    fn test_unusable_geojson_is_rejected() {
        assert!(Boundary::parse("not json").is_none());
        assert!(Boundary::parse(r#"{"type":"Point","coordinates":[1,2]}"#).is_none());
    }

    #[test]
    fn test_square_fallback_from_center_and_size() {
        // 1000 km2 -> ~31.6 km side -> ~0.142 degrees of latitude
        let outline = Boundary::square(-44.85, 26.15, 1000.0).unwrap();
        assert!(outline.contains(-44.85, 26.15));
        assert!(outline.contains(-44.85, 26.15 + 0.13));
        assert!(!outline.contains(-44.85, 26.15 + 0.16));
        assert!(Boundary::square(0.0, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_first_block_by_id_wins_and_ambiguity_is_reported() {
        let blocks = vec![block(7, Some(SQUARE)), block(6, Some(SQUARE))];
        let stations = vec![station(1, -44.826, 26.137, None)];

        let report = plan_associations(&stations, &blocks);
        assert_eq!(report.assigned, 1);
        assert_eq!(report.assignments, vec![StationAssignment { station_id: 1, block_id: 6 }]);
        assert_eq!(report.ambiguous[0].candidate_block_ids, vec![6, 7]);
    }

    #[test]
    fn test_assigned_stations_are_skipped_and_misses_counted() {
        let blocks = vec![block(6, Some(SQUARE))];
        let stations = vec![
            station(1, -44.826, 26.137, Some(6)),
            station(2, 10.0, 10.0, None),
            station(3, -44.9, 26.05, None),
        ];

        let report = plan_associations(&stations, &blocks);
        assert_eq!(report.scanned, 2);
        assert_eq!(report.assigned, 1);
        assert_eq!(report.unmatched, 1);
        assert!(report.ambiguous.is_empty());
    }

    #[test]
    fn test_planning_after_applying_is_a_no_op() {
        let blocks = vec![block(6, Some(SQUARE))];
        let mut stations = vec![station(1, -44.826, 26.137, None), station(2, 10.0, 10.0, None)];

        let first = plan_associations(&stations, &blocks);
        for assignment in &first.assignments {
            if let Some(s) = stations.iter_mut().find(|s| s.id == assignment.station_id) {
                s.block_id = Some(assignment.block_id);
            }
        }

        let second = plan_associations(&stations, &blocks);
        assert!(second.assignments.is_empty());
        assert_eq!(second.unmatched, 1);
        assert_eq!(stations[0].block_id, Some(6));
    }
}
