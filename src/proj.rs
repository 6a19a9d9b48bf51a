//! Coordinate reference systems and reprojection of feature trees.

use std::{fmt, str::FromStr};

use geo::{Coord, MapCoords, MultiPolygon, Polygon};
use proj4rs::{proj::Proj as Proj4, transform::transform};

use crate::{
    error::{HexError, Result},
    geom::{Feature, FeatureCollection, Geometry},
};

/// Supported coordinate reference systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crs {
    /// EPSG:3857, spherical Web Mercator in meters.
    WebMercator,
    /// EPSG:4326, WGS84 longitude/latitude in degrees.
    Wgs84,
}

impl Crs {
    pub fn epsg(self) -> u32 {
        match self {
            Crs::WebMercator => 3857,
            Crs::Wgs84 => 4326,
        }
    }

    pub fn from_epsg(code: u32) -> Result<Self> {
        match code {
            3857 | 900913 => Ok(Crs::WebMercator),
            4326 => Ok(Crs::Wgs84),
            _ => Err(HexError::UnsupportedProjection(format!("EPSG:{code}"))),
        }
    }

    /// Geographic systems take and return radians in proj4rs.
    #[inline] fn is_geographic(self) -> bool { matches!(self, Crs::Wgs84) }

    fn proj4(self) -> &'static str {
        match self {
            Crs::WebMercator => "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs",
            Crs::Wgs84 => "+proj=longlat +datum=WGS84 +no_defs",
        }
    }

    fn build(self) -> Result<Proj4> {
        Proj4::from_proj_string(self.proj4())
            .map_err(|e| HexError::Projection(format!("failed to build PROJ.4 for {self}: {e}")))
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

impl FromStr for Crs {
    type Err = HexError;

    /// Accepts "EPSG:3857", "epsg:4326" or a bare code.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let code = trimmed.get(..5)
            .filter(|prefix| prefix.eq_ignore_ascii_case("epsg:"))
            .map_or(trimmed, |_| &trimmed[5..]);

        code.parse::<u32>()
            .map_err(|_| HexError::UnsupportedProjection(s.to_string()))
            .and_then(Crs::from_epsg)
    }
}

/// A prepared transform between two CRSs; identity when both are the same.
pub struct Transformer {
    from: Crs,
    to: Crs,
    projs: Option<(Proj4, Proj4)>,
}

impl Transformer {
    pub fn new(from: Crs, to: Crs) -> Result<Self> {
        let projs = if from == to { None } else { Some((from.build()?, to.build()?)) };
        Ok(Self { from, to, projs })
    }

    /// Parse both identifiers, failing with `UnsupportedProjection` for anything unknown.
    pub fn from_names(from: &str, to: &str) -> Result<Self> {
        Self::new(from.parse()?, to.parse()?)
    }

    #[inline] pub fn source(&self) -> Crs { self.from }
    #[inline] pub fn target(&self) -> Crs { self.to }

    /// Transform a single (x, y) = (lng, lat) / (easting, northing) pair.
    pub fn transform(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let Some((from, to)) = &self.projs else { return Ok(coord) };

        let mut point = if self.from.is_geographic() {
            (coord.x.to_radians(), coord.y.to_radians(), 0.0)
        } else {
            (coord.x, coord.y, 0.0)
        };

        transform(from, to, &mut point)
            .map_err(|e| HexError::Projection(format!("{} -> {} failed at ({}, {}): {e}", self.from, self.to, coord.x, coord.y)))?;

        Ok(if self.to.is_geographic() {
            Coord { x: point.0.to_degrees(), y: point.1.to_degrees() }
        } else {
            Coord { x: point.0, y: point.1 }
        })
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transformer({} -> {})", self.from, self.to)
    }
}

/// Transform one coordinate between two named CRSs.
pub fn transform_coord(coord: Coord<f64>, from: &str, to: &str) -> Result<Coord<f64>> {
    Transformer::from_names(from, to)?.transform(coord)
}

/// Build a reprojected copy of a geometry tree. The input is left untouched
/// and every non-coordinate field is carried over as is.
pub trait Reproject: Sized {
    fn reproject(&self, transformer: &Transformer) -> Result<Self>;
}

impl Reproject for Polygon<f64> {
    fn reproject(&self, transformer: &Transformer) -> Result<Self> {
        self.try_map_coords(|coord| transformer.transform(coord))
    }
}

impl Reproject for MultiPolygon<f64> {
    fn reproject(&self, transformer: &Transformer) -> Result<Self> {
        self.try_map_coords(|coord| transformer.transform(coord))
    }
}

impl Reproject for Geometry {
    fn reproject(&self, transformer: &Transformer) -> Result<Self> {
        Ok(match self {
            Geometry::Polygon(polygon) => Geometry::Polygon(polygon.reproject(transformer)?),
            Geometry::MultiPolygon(multi) => Geometry::MultiPolygon(multi.reproject(transformer)?),
        })
    }
}

impl Reproject for Feature {
    fn reproject(&self, transformer: &Transformer) -> Result<Self> {
        Ok(Feature {
            id: self.id.clone(),
            geometry: self.geometry.as_ref().map(|g| g.reproject(transformer)).transpose()?,
            properties: self.properties.clone(),
        })
    }
}

impl Reproject for FeatureCollection {
    /// All or nothing: one failing coordinate fails the whole collection.
    fn reproject(&self, transformer: &Transformer) -> Result<Self> {
        self.features().iter()
            .map(|feature| feature.reproject(transformer))
            .collect::<Result<Vec<_>>>()
            .map(FeatureCollection::new)
    }
}
