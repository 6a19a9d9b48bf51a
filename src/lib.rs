#![doc = "hexmap public API"]
mod cache;
mod config;
mod error;
mod geom;
mod hex;
mod io;
mod proj;
mod scheduler;
mod session;

#[doc(inline)]
pub use cache::{CacheKey, ViewportCache};

#[doc(inline)]
pub use config::HexConfig;

#[doc(inline)]
pub use error::{HexError, Result};

#[doc(inline)]
pub use geom::{Feature, FeatureCollection, Geometry, ViewBounds, Viewport};

#[doc(inline)]
pub use hex::{hexagonize, resolution, ColorRule, H3Indexer, HexCell, HexIndexer, HexagonPolygon, DEFAULT_RESOLUTION};

#[doc(inline)]
pub use io::{
    features_to_geojson,
    hexagons_to_geojson,
    read_from_geojson_bytes,
    read_from_geojson_file,
    write_hexagons_to_geojson_bytes,
};

#[doc(inline)]
pub use proj::{transform_coord, Crs, Reproject, Transformer};

#[doc(inline)]
pub use scheduler::{Debouncer, Notifier, Tick, UpdateScheduler};

#[doc(inline)]
pub use session::{HexSession, WORKING_CRS};
