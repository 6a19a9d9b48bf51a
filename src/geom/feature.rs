use geo::{BoundingRect, Coord, MultiPolygon, Polygon, Rect};
use rstar::{primitives::{GeomWithData, Rectangle}, RTree};
use serde_json::{Map, Value};

use super::viewport::ViewBounds;

/// R-tree leaf: a feature's bounding rectangle tagged with its position in the collection.
type FeatureBox = GeomWithData<Rectangle<[f64; 2]>, usize>;

fn feature_box(idx: usize, bbox: Rect<f64>) -> FeatureBox {
    GeomWithData::new(Rectangle::from_corners(bbox.min().into(), bbox.max().into()), idx)
}

/// Areal geometry of a feature.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Geometry {
    /// Constituent polygons (one for a Polygon).
    pub fn polygons(&self) -> &[Polygon<f64>] {
        match self {
            Geometry::Polygon(polygon) => std::slice::from_ref(polygon),
            Geometry::MultiPolygon(multi) => &multi.0,
        }
    }

    /// Outer-ring vertices of every constituent polygon, in order. Holes are not visited.
    pub fn outer_vertices(&self) -> impl Iterator<Item = Coord<f64>> + '_ {
        self.polygons().iter().flat_map(|polygon| polygon.exterior().coords().copied())
    }

    /// Bounding rectangle, or `None` if the geometry has no coordinates.
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        match self {
            Geometry::Polygon(polygon) => polygon.bounding_rect(),
            Geometry::MultiPolygon(multi) => multi.bounding_rect(),
        }
    }

    /// Type tag as written in GeoJSON.
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

/// A geometry plus its open property bag.
/// `geometry` is `None` when the source feature had no usable coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Feature {
    pub id: Option<Value>,
    pub geometry: Option<Geometry>,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry, properties: Map<String, Value>) -> Self {
        Self { id: None, geometry: Some(geometry), properties }
    }

    /// Average of the first outer ring's vertices (closing vertex included).
    pub fn ring_center(&self) -> Option<Coord<f64>> {
        let ring = self.geometry.as_ref()?.polygons().first()?.exterior();
        if ring.0.is_empty() { return None }

        let n = ring.0.len() as f64;
        let sum = ring.coords().fold(Coord { x: 0.0, y: 0.0 }, |acc, c| acc + *c);
        Some(Coord { x: sum.x / n, y: sum.y / n })
    }
}

/// Ordered features with a bounding-box R-tree for viewport queries.
#[derive(Debug, Clone)]
pub struct FeatureCollection {
    features: Vec<Feature>,
    rtree: RTree<FeatureBox>,
}

impl FeatureCollection {
    /// Construct a collection, indexing every feature that has a bounding box.
    pub fn new(features: Vec<Feature>) -> Self {
        let boxes = features.iter().enumerate()
            .filter_map(|(i, feature)| feature.geometry.as_ref()
                .and_then(Geometry::bounding_rect)
                .map(|bbox| feature_box(i, bbox)))
            .collect();

        Self { rtree: RTree::bulk_load(boxes), features }
    }

    #[inline] pub fn len(&self) -> usize { self.features.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.features.is_empty() }

    #[inline] pub fn features(&self) -> &[Feature] { &self.features }

    #[inline] pub fn into_features(self) -> Vec<Feature> { self.features }

    /// Features whose bounding box touches `bounds`, in collection order.
    pub fn intersecting(&self, bounds: &ViewBounds) -> impl Iterator<Item = &Feature> {
        let mut hits = self.rtree.locate_in_envelope_intersecting(&bounds.envelope())
            .map(|leaf| leaf.data)
            .collect::<Vec<_>>();
        hits.sort_unstable();
        hits.into_iter().map(|i| &self.features[i])
    }
}

impl Default for FeatureCollection {
    fn default() -> Self { Self::new(Vec::new()) }
}

impl PartialEq for FeatureCollection {
    fn eq(&self, other: &Self) -> bool { self.features == other.features }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<T: IntoIterator<Item = Feature>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
