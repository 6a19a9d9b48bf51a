// End-to-end viewport scenarios: Web Mercator source in, colored hexagons out.

use std::{collections::HashSet, sync::Arc};

use hexmap::{
    hexagonize, resolution, ColorRule, H3Indexer, HexConfig, HexSession, Viewport,
    read_from_geojson_bytes,
};

/// EPSG:3857 meters for one degree of longitude, and for latitude 1° N.
const ONE_DEGREE_X: f64 = 111_319.490_793_273_58;
const ONE_DEGREE_Y: f64 = 111_325.142_866_384_86;

fn red_square_geojson(extra: &str) -> String {
    format!(r#"{{
        "type": "FeatureCollection",
        "features": [
            {extra}
            {{
                "type": "Feature",
                "geometry": {{
                    "type": "Polygon",
                    "coordinates": [[[0, 0], [{x}, 0], [{x}, {y}], [0, {y}], [0, 0]]]
                }},
                "properties": {{ "COLOR_HEX": "ff0000" }}
            }}
        ]
    }}"#, x = ONE_DEGREE_X, y = ONE_DEGREE_Y)
}

fn loaded_session(source: &str) -> HexSession {
    let mut session = HexSession::new(HexConfig::default()).unwrap();
    session.load_geojson_bytes(source.as_bytes()).unwrap();
    session
}

#[test]
fn source_is_reprojected_to_degrees() {
    let session = loaded_session(&red_square_geojson(""));
    let center = session.center().unwrap();
    // (0 + 1 + 1 + 0 + 0) / 5 on both axes.
    assert!((center.x - 0.4).abs() < 1e-6, "{center:?}");
    assert!((center.y - 0.4).abs() < 1e-6, "{center:?}");
}

#[test]
fn square_in_view_is_all_red() {
    let mut session = loaded_session(&red_square_geojson(""));
    let viewport = Viewport::new(0.0, 1.0, 0.0, 1.0, 10.0);
    assert_eq!(resolution(viewport.zoom), 5);

    let hexagons = session.hexagons(&viewport);
    assert!(!hexagons.is_empty());
    for hexagon in hexagons.iter() {
        assert_eq!(hexagon.color, "#ff0000");
        let ring = &hexagon.boundary.0;
        assert!(ring.len() >= 5);
        assert_eq!(ring.first(), ring.last());
    }
}

#[test]
fn far_viewport_is_empty() {
    let mut session = loaded_session(&red_square_geojson(""));
    let hexagons = session.hexagons(&Viewport::new(-0.5, 0.5, 49.5, 50.5, 10.0));
    assert!(hexagons.is_empty());
}

#[test]
fn feature_without_coordinates_is_skipped() {
    let broken = r#"{ "type": "Feature", "geometry": { "type": "Polygon" }, "properties": { "COLOR_HEX": "00ff00" } },"#;
    let mut with_broken = loaded_session(&red_square_geojson(broken));
    let mut clean = loaded_session(&red_square_geojson(""));
    assert_eq!(with_broken.features().len(), 2);

    let viewport = Viewport::new(0.0, 1.0, 0.0, 1.0, 10.0);
    let a = with_broken.hexagons(&viewport);
    let b = clean.hexagons(&viewport);
    assert_eq!(a[..], b[..]);
    assert!(a.iter().all(|h| h.color == "#ff0000"));
}

#[test]
fn hexagonizer_is_deterministic_and_deduplicated() {
    let mut source = String::from(r#"{ "type": "FeatureCollection", "features": ["#);
    // A row of overlapping squares sharing corners, alternating colors.
    for i in 0..12 {
        if i > 0 { source.push(','); }
        let x0 = i as f64 * 0.25;
        let color = if i % 2 == 0 { "112233" } else { "aabbcc" };
        source.push_str(&format!(r#"{{
            "type": "Feature",
            "geometry": {{ "type": "Polygon", "coordinates": [[[{x0}, 0], [{x1}, 0], [{x1}, 0.5], [{x0}, 0.5], [{x0}, 0]]] }},
            "properties": {{ "COLOR_HEX": "{color}" }}
        }}"#, x1 = x0 + 0.5));
    }
    source.push_str("]}");

    let collection = read_from_geojson_bytes(source.as_bytes()).unwrap();
    let bounds = Viewport::new(0.0, 0.5, 0.0, 3.25, 7.0).buffered(0.5);
    let colors = ColorRule::default();

    let first = hexagonize(&collection, &bounds, 4, &H3Indexer, &colors);
    let second = hexagonize(&collection, &bounds, 4, &H3Indexer, &colors);
    assert_eq!(first, second);

    let cells = first.iter().map(|h| h.cell).collect::<HashSet<_>>();
    assert_eq!(cells.len(), first.len());
    assert_eq!(first[0].color, "#112233");
}

#[test]
fn nearby_viewports_share_a_cache_entry() {
    let mut session = loaded_session(&red_square_geojson(""));
    let v1 = Viewport::new(0.0, 1.0, 0.0, 1.0, 10.0);
    let v2 = Viewport::new(0.03, 0.9, 0.04, 2.0, 9.8);

    let a = session.hexagons(&v1);
    let b = session.hexagons(&v2);
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(session.cache().len(), 1);
    assert_eq!(session.cache().hits(), 1);

    // Different resolution, new entry.
    session.hexagons(&Viewport::new(0.0, 1.0, 0.0, 1.0, 14.0));
    assert_eq!(session.cache().len(), 2);
}

#[test]
fn source_load_failure_leaves_no_data() {
    let mut session = HexSession::new(HexConfig::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    assert!(session.load_geojson_file(&dir.path().join("data.json")).is_err());
    assert!(session.hexagons(&Viewport::new(0.0, 1.0, 0.0, 1.0, 10.0)).is_empty());
}
