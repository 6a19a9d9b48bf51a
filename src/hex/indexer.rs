use std::fmt;

use geo::Coord;
use h3o::{CellIndex, LatLng, Resolution};

/// Opaque identifier of one cell of the hexagonal grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexCell(u64);

impl HexCell {
    #[inline] pub fn new(raw: u64) -> Self { Self(raw) }

    #[inline] pub fn raw(self) -> u64 { self.0 }
}

impl fmt::Display for HexCell {
    /// Lowercase hex, the canonical H3 string form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

/// Point → cell and cell → boundary, the two grid operations the hexagonizer needs.
/// Implementations must be pure: the same input always yields the same output.
pub trait HexIndexer {
    /// Cell containing `coord` (x = lng, y = lat, degrees), or `None` if the
    /// coordinate or resolution is unusable.
    fn cell_at(&self, coord: Coord<f64>, resolution: u8) -> Option<HexCell>;

    /// Open boundary ring of `cell` (x = lng, y = lat); empty for an invalid cell.
    fn boundary(&self, cell: HexCell) -> Vec<Coord<f64>>;
}

/// H3 grid backed by `h3o`.
#[derive(Debug, Clone, Copy, Default)]
pub struct H3Indexer;

impl HexIndexer for H3Indexer {
    fn cell_at(&self, coord: Coord<f64>, resolution: u8) -> Option<HexCell> {
        let resolution = Resolution::try_from(resolution).ok()?;
        let latlng = LatLng::new(coord.y, coord.x).ok()?;
        Some(HexCell(u64::from(latlng.to_cell(resolution))))
    }

    fn boundary(&self, cell: HexCell) -> Vec<Coord<f64>> {
        let Ok(cell) = CellIndex::try_from(cell.0) else { return Vec::new() };
        cell.boundary().iter()
            .map(|vertex| Coord { x: vertex.lng(), y: vertex.lat() })
            .collect()
    }
}
