use ahash::AHashSet;
use geo::LineString;
use tracing::trace;

use crate::geom::{FeatureCollection, ViewBounds};
use super::{color::ColorRule, indexer::{HexCell, HexIndexer}};

/// One renderable hexagon: closed boundary ring (EPSG:4326) and fill color.
#[derive(Debug, Clone, PartialEq)]
pub struct HexagonPolygon {
    pub cell: HexCell,
    pub boundary: LineString<f64>,
    pub color: String,
}

/// Hexagons covering the outer-ring vertices of `collection` that fall inside `bounds`.
///
/// Features are visited in collection order, then polygons, then vertices; the
/// output follows the order in which cells are first discovered. A cell is
/// emitted once per call and takes the color of the feature that reached it
/// first, so overlapping features of different colors resolve by order.
pub fn hexagonize<I: HexIndexer + ?Sized>(
    collection: &FeatureCollection,
    bounds: &ViewBounds,
    resolution: u8,
    indexer: &I,
    colors: &ColorRule,
) -> Vec<HexagonPolygon> {
    let mut seen = AHashSet::new();
    let mut hexagons = Vec::new();

    // Features without geometry have no box in the R-tree, so they never show up here.
    for feature in collection.intersecting(bounds) {
        let Some(geometry) = &feature.geometry else { continue };
        let mut color: Option<String> = None;

        for vertex in geometry.outer_vertices().filter(|&c| bounds.contains(c)) {
            let Some(cell) = indexer.cell_at(vertex, resolution) else { continue };
            if !seen.insert(cell) { continue }

            let mut ring = indexer.boundary(cell);
            let Some(&first) = ring.first() else { continue };
            ring.push(first);

            let fill = color.get_or_insert_with(|| colors.color_of(&feature.properties));
            hexagons.push(HexagonPolygon { cell, boundary: LineString(ring), color: fill.clone() });
        }
    }

    trace!(resolution, cells = hexagons.len(), "hexagonized viewport");
    hexagons
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use geo::{polygon, Coord, Polygon};
    use serde_json::{json, Map};

    use crate::{geom::{Feature, Geometry}, hex::H3Indexer};
    use super::*;

    fn colored(polygon: Polygon<f64>, color: &str) -> Feature {
        let mut properties = Map::new();
        properties.insert("COLOR_HEX".into(), json!(color));
        Feature::new(Geometry::Polygon(polygon), properties)
    }

    fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ]
    }

    /// Counts `cell_at` calls on top of the real grid.
    #[derive(Default)]
    struct Counting { lookups: Cell<usize> }

    impl HexIndexer for Counting {
        fn cell_at(&self, coord: Coord<f64>, resolution: u8) -> Option<HexCell> {
            self.lookups.set(self.lookups.get() + 1);
            H3Indexer.cell_at(coord, resolution)
        }
        fn boundary(&self, cell: HexCell) -> Vec<Coord<f64>> { H3Indexer.boundary(cell) }
    }

    #[test]
    fn rings_are_closed() {
        let collection = FeatureCollection::new(vec![colored(square(0.0, 0.0, 1.0), "ff0000")]);
        let bounds = ViewBounds::new(-0.5, 1.5, -0.5, 1.5);
        let hexagons = hexagonize(&collection, &bounds, 5, &H3Indexer, &ColorRule::default());
        assert!(!hexagons.is_empty());
        for hexagon in &hexagons {
            let ring = &hexagon.boundary.0;
            assert!(ring.len() >= 5);
            assert_eq!(ring.first(), ring.last());
        }
    }

    #[test]
    fn one_polygon_per_cell() {
        // Coarse resolution: all five vertices land in the same cell.
        let collection = FeatureCollection::new(vec![
            colored(square(10.0, 10.0, 0.01), "ff0000"),
            colored(square(10.0, 10.0, 0.01), "00ff00"),
        ]);
        let bounds = ViewBounds::new(9.0, 11.0, 9.0, 11.0);
        let hexagons = hexagonize(&collection, &bounds, 1, &H3Indexer, &ColorRule::default());
        assert_eq!(hexagons.len(), 1);
        assert_eq!(hexagons[0].color, "#ff0000");
    }

    #[test]
    fn first_feature_wins_color() {
        let red = colored(square(10.0, 10.0, 0.01), "ff0000");
        let blue = colored(square(10.0, 10.0, 0.01), "0000ff");
        let bounds = ViewBounds::new(9.0, 11.0, 9.0, 11.0);

        let forward = FeatureCollection::new(vec![red.clone(), blue.clone()]);
        let reverse = FeatureCollection::new(vec![blue, red]);
        let a = hexagonize(&forward, &bounds, 3, &H3Indexer, &ColorRule::default());
        let b = hexagonize(&reverse, &bounds, 3, &H3Indexer, &ColorRule::default());
        assert_eq!(a[0].color, "#ff0000");
        assert_eq!(b[0].color, "#0000ff");
    }

    #[test]
    fn only_vertices_inside_bounds_are_indexed() {
        let collection = FeatureCollection::new(vec![colored(square(0.0, 0.0, 10.0), "ff0000")]);
        // Only the (0, 0) corner, visited twice as first and closing vertex.
        let bounds = ViewBounds::new(-1.0, 1.0, -1.0, 1.0);
        let counting = Counting::default();
        let hexagons = hexagonize(&collection, &bounds, 7, &counting, &ColorRule::default());
        assert_eq!(counting.lookups.get(), 2);
        assert_eq!(hexagons.len(), 1);
        assert_eq!(hexagons[0].cell, H3Indexer.cell_at(Coord { x: 0.0, y: 0.0 }, 7).unwrap());
    }

    #[test]
    fn empty_when_nothing_visible() {
        let collection = FeatureCollection::new(vec![colored(square(0.0, 0.0, 1.0), "ff0000")]);
        let bounds = ViewBounds::new(-0.5, 1.5, 49.5, 50.5);
        assert!(hexagonize(&collection, &bounds, 5, &H3Indexer, &ColorRule::default()).is_empty());
        let empty = FeatureCollection::default();
        assert!(hexagonize(&empty, &bounds, 5, &H3Indexer, &ColorRule::default()).is_empty());
    }
}
