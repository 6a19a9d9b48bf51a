use std::path::Path;

use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::{json, Map, Value};

use crate::{
    error::{HexError, Result},
    geom::{Feature, FeatureCollection, Geometry},
    hex::HexagonPolygon,
};

/// Read a FeatureCollection from GeoJSON bytes.
/// Features whose geometry is missing or unusable are kept with `geometry: None`.
pub fn read_from_geojson_bytes(bytes: &[u8]) -> Result<FeatureCollection> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| HexError::SourceLoad(format!("invalid GeoJSON: {e}")))?;

    if value["type"].as_str() != Some("FeatureCollection") {
        return Err(HexError::SourceLoad("expected a GeoJSON FeatureCollection".to_string()));
    }
    let features = value["features"].as_array()
        .ok_or_else(|| HexError::SourceLoad("FeatureCollection has no features array".to_string()))?;

    Ok(features.iter().map(parse_feature).collect())
}

/// Read a FeatureCollection from a GeoJSON file.
pub fn read_from_geojson_file(path: &Path) -> Result<FeatureCollection> {
    let bytes = std::fs::read(path)
        .map_err(|e| HexError::SourceLoad(format!("{}: {e}", path.display())))?;
    read_from_geojson_bytes(&bytes)
}

fn parse_feature(value: &Value) -> Feature {
    Feature {
        id: value.get("id").cloned(),
        geometry: value.get("geometry").and_then(parse_geometry),
        properties: value["properties"].as_object().cloned().unwrap_or_default(),
    }
}

/// Polygon or MultiPolygon; anything else (or no coordinates) is `None`.
fn parse_geometry(value: &Value) -> Option<Geometry> {
    let coords = value["coordinates"].as_array()?;
    match value["type"].as_str()? {
        "Polygon" => parse_polygon(coords).map(Geometry::Polygon),
        "MultiPolygon" => {
            let polygons = coords.iter()
                .filter_map(|polygon| polygon.as_array().and_then(|rings| parse_polygon(rings)))
                .collect::<Vec<_>>();
            if polygons.is_empty() { return None }
            Some(Geometry::MultiPolygon(MultiPolygon(polygons)))
        }
        _ => None,
    }
}

/// `[exterior, hole, hole, ...]`; requires a non-empty exterior ring.
fn parse_polygon(rings: &[Value]) -> Option<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| ring.as_array().and_then(|r| parse_ring(r)));
    let exterior = rings.next()??;
    if exterior.0.is_empty() { return None }

    let interiors = rings.flatten().filter(|ring| !ring.0.is_empty()).collect();
    Some(Polygon::new(exterior, interiors))
}

/// `[[x, y], [x, y], ...]`, closed on read. Any non-numeric position invalidates the ring.
fn parse_ring(coords: &[Value]) -> Option<LineString<f64>> {
    let mut points = coords.iter()
        .map(|pair| {
            let pair = pair.as_array()?;
            if pair.len() < 2 { return None }
            Some(Coord { x: pair[0].as_f64()?, y: pair[1].as_f64()? })
        })
        .collect::<Option<Vec<_>>>()?;

    if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
        if first != last { points.push(first) }
    }

    Some(LineString(points))
}

fn ring_to_json(ring: &LineString<f64>) -> Value {
    Value::Array(ring.coords().map(|c| json!([c.x, c.y])).collect())
}

fn polygon_to_json(polygon: &Polygon<f64>) -> Value {
    let mut rings = vec![ring_to_json(polygon.exterior())];
    rings.extend(polygon.interiors().iter().map(ring_to_json));
    Value::Array(rings)
}

/// GeoJSON FeatureCollection for a feature tree (properties and ids preserved).
pub fn features_to_geojson(collection: &FeatureCollection) -> Value {
    let features = collection.features().iter().map(|feature| {
        let geometry = match &feature.geometry {
            Some(Geometry::Polygon(polygon)) => json!({
                "type": "Polygon",
                "coordinates": polygon_to_json(polygon),
            }),
            Some(Geometry::MultiPolygon(multi)) => json!({
                "type": "MultiPolygon",
                "coordinates": multi.0.iter().map(polygon_to_json).collect::<Vec<_>>(),
            }),
            None => Value::Null,
        };

        let mut object = Map::new();
        object.insert("type".into(), json!("Feature"));
        if let Some(id) = &feature.id { object.insert("id".into(), id.clone()); }
        object.insert("geometry".into(), geometry);
        object.insert("properties".into(), Value::Object(feature.properties.clone()));
        Value::Object(object)
    }).collect::<Vec<_>>();

    json!({ "type": "FeatureCollection", "features": features })
}

/// GeoJSON FeatureCollection of hexagons, one Polygon feature per cell with
/// `color` and `h3` properties.
pub fn hexagons_to_geojson(hexagons: &[HexagonPolygon]) -> Value {
    let features = hexagons.iter().map(|hexagon| json!({
        "type": "Feature",
        "geometry": {
            "type": "Polygon",
            "coordinates": [ring_to_json(&hexagon.boundary)],
        },
        "properties": {
            "color": hexagon.color,
            "h3": hexagon.cell.to_string(),
        },
    })).collect::<Vec<_>>();

    json!({ "type": "FeatureCollection", "features": features })
}

/// Serialize hexagons to GeoJSON bytes.
pub fn write_hexagons_to_geojson_bytes(hexagons: &[HexagonPolygon]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&hexagons_to_geojson(hexagons))?)
}

#[cfg(test)]
mod tests {
    use crate::hex::HexCell;
    use super::*;

    const SOURCE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "a",
                "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1]]] },
                "properties": { "COLOR_HEX": "ff0000", "name": "square" }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Polygon" },
                "properties": {}
            },
            {
                "type": "Feature",
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[5, 5], [6, 5], [6, 6], [5, 5]]],
                        [[[7, 7], [8, 7], [8, 8], [7, 7]], [[7.2, 7.2], [7.4, 7.2], [7.4, 7.4], [7.2, 7.2]]]
                    ]
                }
            },
            { "type": "Feature", "geometry": { "type": "Point", "coordinates": [1, 2] }, "properties": null },
            { "type": "Feature", "geometry": null, "properties": { "x": 1 } },
            { "type": "Feature", "geometry": { "type": "Polygon", "coordinates": [[[0, 0], ["a", 1]]] } }
        ]
    }"#;

    #[test]
    fn reads_polygons_and_keeps_malformed_features() {
        let collection = read_from_geojson_bytes(SOURCE.as_bytes()).unwrap();
        assert_eq!(collection.len(), 6);

        let features = collection.features();
        let Some(Geometry::Polygon(square)) = &features[0].geometry else { panic!("expected polygon") };
        assert_eq!(square.exterior().0.len(), 5, "ring is closed on read");
        assert_eq!(features[0].id, Some(json!("a")));
        assert_eq!(features[0].properties["name"], json!("square"));

        assert_eq!(features[1].geometry, None);
        let Some(Geometry::MultiPolygon(multi)) = &features[2].geometry else { panic!("expected multipolygon") };
        assert_eq!(multi.0.len(), 2);
        assert_eq!(multi.0[1].interiors().len(), 1);
        assert!(features[2].properties.is_empty());

        assert_eq!(features[3].geometry, None);
        assert_eq!(features[4].geometry, None);
        assert_eq!(features[4].properties["x"], json!(1));
        assert_eq!(features[5].geometry, None);
    }

    #[test]
    fn rejects_non_collections() {
        for bad in ["not json", r#"{"type": "Feature"}"#, r#"{"type": "FeatureCollection"}"#] {
            assert!(matches!(read_from_geojson_bytes(bad.as_bytes()), Err(HexError::SourceLoad(_))), "{bad}");
        }
    }

    #[test]
    fn missing_file_is_a_source_failure() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_from_geojson_file(&dir.path().join("missing.geojson"));
        assert!(matches!(result, Err(HexError::SourceLoad(_))));
    }

    #[test]
    fn features_survive_write_and_read() {
        let collection = read_from_geojson_bytes(SOURCE.as_bytes()).unwrap();
        let bytes = serde_json::to_vec(&features_to_geojson(&collection)).unwrap();
        let reread = read_from_geojson_bytes(&bytes).unwrap();
        assert_eq!(reread, collection);
    }

    #[test]
    fn writes_hexagon_features() {
        let hexagon = HexagonPolygon {
            cell: HexCell::new(0x85283473fffffff),
            boundary: LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
            color: "#ff0000".to_string(),
        };
        let bytes = write_hexagons_to_geojson_bytes(&[hexagon]).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        let feature = &value["features"][0];
        assert_eq!(feature["properties"]["color"], json!("#ff0000"));
        assert_eq!(feature["properties"]["h3"], json!("85283473fffffff"));
        assert_eq!(feature["geometry"]["coordinates"][0].as_array().unwrap().len(), 4);
    }
}
