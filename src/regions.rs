//! Named region polygons loaded from a GeoJSON FeatureCollection.
//!
//! The set preserves the input feature order because the matcher's tie-break
//! for overlapping polygons is "first match in input order"; an unordered map
//! would make that non-deterministic.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geo::{LineString, MultiPolygon, Polygon};
use geojson::GeoJson;
use tracing::info;

use crate::error::{Error, Result};
use crate::geometry;

/// A named polygonal area used to classify points.
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// Immutable mapping from region name to polygon geometry.
///
/// Built once per run. Iteration follows insertion order; lookups by name
/// go through a side index.
#[derive(Debug, Default)]
pub struct RegionSet {
    regions: Vec<Region>,
    by_name: HashMap<String, usize>,
}

impl RegionSet {
    /// Build a set from (name, geometry) pairs.
    ///
    /// Geometries are normalized before storage so later containment tests
    /// never see self-intersecting rings. A repeated name is a hard error:
    /// silently overwriting a polygon would hide data problems in the input.
    pub fn build(features: impl IntoIterator<Item = (String, MultiPolygon<f64>)>) -> Result<Self> {
        let mut set = RegionSet::default();
        for (name, raw) in features {
            if set.by_name.contains_key(&name) {
                return Err(Error::DuplicateRegion(name));
            }
            let geometry = geometry::normalize(&raw);
            set.by_name.insert(name.clone(), set.regions.len());
            set.regions.push(Region { name, geometry });
        }
        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<&Region> {
        self.by_name.get(name).map(|&i| &self.regions[i])
    }

    /// Regions in input order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Load a RegionSet from a GeoJSON file, naming each region after the value
/// of `property_key` in the feature's properties.
pub fn load_regions(path: &Path, property_key: &str) -> Result<RegionSet> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let geojson = GeoJson::from_reader(reader).map_err(|e| Error::region_load(e.to_string()))?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(Error::region_load(format!(
            "{} is not a FeatureCollection",
            path.display()
        )));
    };

    let mut features = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let name = feature
            .properties
            .as_ref()
            .and_then(|props| props.get(property_key))
            .map(|value| match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .ok_or_else(|| {
                Error::region_load(format!("feature has no {property_key:?} property"))
            })?;

        let Some(geometry) = feature.geometry else {
            return Err(Error::region_load(format!("feature {name:?} has no geometry")));
        };
        features.push((name, to_multi_polygon(&geometry)?));
    }

    let set = RegionSet::build(features)?;
    info!(path = %path.display(), regions = set.len(), "loaded region file");
    Ok(set)
}

fn to_multi_polygon(geometry: &geojson::Geometry) -> Result<MultiPolygon<f64>> {
    match &geometry.value {
        geojson::Value::Polygon(rings) => Ok(MultiPolygon::new(vec![rings_to_polygon(rings)])),
        geojson::Value::MultiPolygon(polygons) => Ok(MultiPolygon::new(
            polygons.iter().map(|rings| rings_to_polygon(rings)).collect(),
        )),
        other => Err(Error::region_load(format!(
            "unsupported geometry type {}, expected Polygon or MultiPolygon",
            other.type_name()
        ))),
    }
}

fn rings_to_polygon(rings: &[Vec<Vec<f64>>]) -> Polygon<f64> {
    let exterior = rings
        .first()
        .map(|ring| ring_to_line_string(ring))
        .unwrap_or_else(|| LineString::new(Vec::new()));
    let holes = rings.iter().skip(1).map(|ring| ring_to_line_string(ring)).collect();
    Polygon::new(exterior, holes)
}

fn ring_to_line_string(ring: &[Vec<f64>]) -> LineString<f64> {
    LineString::new(ring.iter().map(|coord| (coord[0], coord[1]).into()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;
    use std::io::Write;

    fn square(offset: f64) -> MultiPolygon<f64> {
        polygon![
            (x: offset, y: 0.0),
            (x: offset + 10.0, y: 0.0),
            (x: offset + 10.0, y: 10.0),
            (x: offset, y: 10.0),
            (x: offset, y: 0.0),
        ]
        .into()
    }

    #[test]
    fn build_preserves_insertion_order() {
        let set = RegionSet::build(vec![
            ("zulu".to_string(), square(0.0)),
            ("alpha".to_string(), square(20.0)),
            ("mike".to_string(), square(40.0)),
        ])
        .unwrap();

        let names: Vec<&str> = set.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["zulu", "alpha", "mike"]);
        assert_eq!(set.get("alpha").unwrap().name, "alpha");
        assert!(set.get("missing").is_none());
    }

    #[test]
    fn build_rejects_duplicate_names() {
        let result = RegionSet::build(vec![
            ("north".to_string(), square(0.0)),
            ("north".to_string(), square(20.0)),
        ]);
        assert!(matches!(result, Err(Error::DuplicateRegion(name)) if name == "north"));
    }

    fn write_geojson(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const TWO_SQUARES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"nom": "east"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"nom": "west"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[-10,0],[0,0],[0,10],[-10,10],[-10,0]]]
                }
            }
        ]
    }"#;

    #[test]
    fn load_regions_reads_feature_collection() {
        let file = write_geojson(TWO_SQUARES);
        let set = load_regions(file.path(), "nom").unwrap();
        let names: Vec<&str> = set.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["east", "west"]);
    }

    #[test]
    fn load_regions_fails_on_missing_property_key() {
        let file = write_geojson(TWO_SQUARES);
        let result = load_regions(file.path(), "no_such_key");
        assert!(matches!(result, Err(Error::RegionLoad(_))));
    }

    #[test]
    fn load_regions_fails_on_duplicate_names() {
        let duplicated = TWO_SQUARES.replace("west", "east");
        let file = write_geojson(&duplicated);
        let result = load_regions(file.path(), "nom");
        assert!(matches!(result, Err(Error::DuplicateRegion(name)) if name == "east"));
    }

    #[test]
    fn load_regions_rejects_non_polygon_geometry() {
        let file = write_geojson(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "properties": {"nom": "line"},
                        "geometry": {"type": "LineString", "coordinates": [[0,0],[1,1]]}
                    }
                ]
            }"#,
        );
        let result = load_regions(file.path(), "nom");
        assert!(matches!(result, Err(Error::RegionLoad(_))));
    }
}
