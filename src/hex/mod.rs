pub(crate) mod color;
mod hexagonize;
mod indexer;
mod resolution;

pub use color::ColorRule;
pub use hexagonize::{hexagonize, HexagonPolygon};
pub use indexer::{H3Indexer, HexCell, HexIndexer};
pub use resolution::{resolution, DEFAULT_RESOLUTION};
