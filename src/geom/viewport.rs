use geo::Coord;
use rstar::AABB;
use serde::{Deserialize, Serialize};

use crate::hex::resolution;

/// Visible map rectangle (EPSG:4326 degrees) plus the continuous zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(min_lat: f64, max_lat: f64, min_lng: f64, max_lng: f64, zoom: f64) -> Self {
        Self { min_lat, max_lat, min_lng, max_lng, zoom }
    }

    /// Build from south-west and north-east corners (x = lng, y = lat).
    pub fn from_corners(south_west: Coord<f64>, north_east: Coord<f64>, zoom: f64) -> Self {
        Self::new(south_west.y, north_east.y, south_west.x, north_east.x, zoom)
    }

    /// Grid resolution implied by the zoom level.
    #[inline] pub fn resolution(&self) -> u8 { resolution(self.zoom) }

    /// Expand every edge outward by `margin` degrees.
    pub fn buffered(&self, margin: f64) -> ViewBounds {
        ViewBounds::new(self.min_lat, self.max_lat, self.min_lng, self.max_lng).expand(margin)
    }
}

/// Normalized rectangle used for membership tests: min <= max on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    min_lat: f64,
    max_lat: f64,
    min_lng: f64,
    max_lng: f64,
}

impl ViewBounds {
    /// Inverted edges are swapped so the invariant always holds.
    pub fn new(lat_a: f64, lat_b: f64, lng_a: f64, lng_b: f64) -> Self {
        Self {
            min_lat: lat_a.min(lat_b),
            max_lat: lat_a.max(lat_b),
            min_lng: lng_a.min(lng_b),
            max_lng: lng_a.max(lng_b),
        }
    }

    /// Grow outward by `margin` on every side.
    pub fn expand(&self, margin: f64) -> Self {
        Self::new(
            self.min_lat - margin,
            self.max_lat + margin,
            self.min_lng - margin,
            self.max_lng + margin,
        )
    }

    #[inline] pub fn min_lat(&self) -> f64 { self.min_lat }
    #[inline] pub fn max_lat(&self) -> f64 { self.max_lat }
    #[inline] pub fn min_lng(&self) -> f64 { self.min_lng }
    #[inline] pub fn max_lng(&self) -> f64 { self.max_lng }

    /// Inclusive on all four edges.
    #[inline]
    pub fn contains(&self, coord: Coord<f64>) -> bool {
        coord.y >= self.min_lat && coord.y <= self.max_lat
            && coord.x >= self.min_lng && coord.x <= self.max_lng
    }

    /// R-tree envelope in (lng, lat) order.
    pub(crate) fn envelope(&self) -> AABB<[f64; 2]> {
        AABB::from_corners([self.min_lng, self.min_lat], [self.max_lng, self.max_lat])
    }
}
